//! `push`, `pull`, `info`, `delete`.

use std::path::PathBuf;

use dir_proto::dir::v1::{LookupRequest, PullChunk, PushChunk, RecordRef};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio_stream::StreamExt;

use crate::client;
use crate::output::{self, OutputFormat};
use crate::reference::{self, Reference};

pub async fn push(server: &str, path: Option<PathBuf>, stdin: bool, output: OutputFormat) -> anyhow::Result<()> {
    let bytes = if stdin || path.is_none() {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        buf
    } else {
        tokio::fs::read(path.unwrap()).await?
    };

    let mut client = client::store(server).await?;
    let chunk = PushChunk { data: bytes };
    let response = client.push(tokio_stream::once(chunk)).await?.into_inner();

    match output {
        OutputFormat::Raw => println!("{}", response.cid),
        _ => output::print_value(output, &serde_json::json!({ "cid": response.cid }))?,
    }
    Ok(())
}

pub async fn pull(server: &str, raw_ref: &str, output: OutputFormat) -> anyhow::Result<()> {
    let reference = Reference::parse(raw_ref)?;
    let cid = reference::resolve(server, &reference).await?;

    let mut client = client::store(server).await?;
    let mut stream = client.pull(RecordRef { cid: cid.clone() }).await?.into_inner();

    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk: PullChunk = chunk?;
        buf.extend_from_slice(&chunk.data);
    }

    match output {
        OutputFormat::Raw => {
            use std::io::Write;
            std::io::stdout().write_all(&buf)?;
        }
        OutputFormat::Json | OutputFormat::Human => {
            let value: serde_json::Value = serde_json::from_slice(&buf)?;
            output::print_value(output, &value)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RecordInfo {
    cid: String,
    content_type: String,
    size: u64,
    digest: String,
    annotations: std::collections::BTreeMap<String, String>,
}

pub async fn info(server: &str, raw_ref: &str, output: OutputFormat) -> anyhow::Result<()> {
    let reference = Reference::parse(raw_ref)?;
    let cid = reference::resolve(server, &reference).await?;

    let mut client = client::store(server).await?;
    let response = client.lookup(LookupRequest { cid: cid.clone() }).await?.into_inner();

    let info = RecordInfo {
        cid,
        content_type: response.content_type,
        size: response.size,
        digest: response.digest,
        annotations: response.annotations.into_iter().collect(),
    };
    output::print_value(output, &info)
}

pub async fn delete(server: &str, cid: &str) -> anyhow::Result<()> {
    let mut client = client::store(server).await?;
    client.delete(RecordRef { cid: cid.to_string() }).await?;
    println!("deleted {cid}");
    Ok(())
}
