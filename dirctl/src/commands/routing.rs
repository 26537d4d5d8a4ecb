//! `publish`, `unpublish`, `list peers`.

use dir_proto::dir::v1::{ListPeersRequest, PublishRequest, RecordRef};
use tokio_stream::StreamExt;

use crate::client;
use crate::output::{self, OutputFormat};

pub async fn publish(server: &str, cid: &str, network: bool) -> anyhow::Result<()> {
    let mut client = client::routing(server).await?;
    client.publish(PublishRequest { cid: cid.to_string(), network }).await?;
    println!("published {cid}");
    Ok(())
}

pub async fn unpublish(server: &str, cid: &str) -> anyhow::Result<()> {
    let mut client = client::routing(server).await?;
    client.unpublish(RecordRef { cid: cid.to_string() }).await?;
    println!("unpublished {cid}");
    Ok(())
}

pub async fn list_peers(server: &str, digest: &str, output: OutputFormat) -> anyhow::Result<()> {
    let mut client = client::routing(server).await?;
    let mut stream = client
        .list_peers(ListPeersRequest { cid: digest.to_string(), limit: 0, min_match_score: 0 })
        .await?
        .into_inner();

    let mut rows = Vec::new();
    while let Some(row) = stream.next().await {
        let row = row?;
        rows.push(serde_json::json!({
            "cid": row.cid,
            "peer": row.peer,
            "score": row.score,
            "matching_queries": row.matching_queries,
        }));
    }
    output::print_rows(output, &rows)
}
