//! `search`: translates repeatable CLI flags into one `SearchRequest`.
//! Multiple values of the same flag OR; different flags AND — the
//! `SearchRequest`/`SearchFilter` wire shape already has that semantics
//! baked in, so this is a straight field-by-field copy.

use dir_proto::dir::v1::SearchRequest;
use tokio_stream::StreamExt;

use crate::client;
use crate::output::{self, OutputFormat};

#[derive(Default)]
pub struct SearchArgs {
    pub name: Vec<String>,
    pub version: Vec<String>,
    pub skill_id: Vec<i64>,
    pub skill_name: Vec<String>,
    pub locator: Vec<String>,
    pub domain: Vec<String>,
    pub domain_id: Vec<i64>,
    pub module: Vec<String>,
    pub author: Vec<String>,
    pub schema_version: Vec<String>,
    pub created_at: Vec<String>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn run(server: &str, args: SearchArgs, output: OutputFormat) -> anyhow::Result<()> {
    let request = SearchRequest {
        names: args.name,
        skill_names: args.skill_name,
        locator_types: Vec::new(),
        locator_urls: args.locator,
        module_names: args.module,
        domain_names: args.domain,
        authors: args.author,
        versions: args.version,
        schema_versions: args.schema_version,
        created_ats: args.created_at,
        skill_ids: args.skill_id,
        module_ids: Vec::new(),
        domain_ids: args.domain_id,
        verified: None,
        limit: if args.limit > 0 { args.limit } else { 100 },
        offset: args.offset,
    };

    let mut client = client::search(server).await?;
    let mut stream = client.get_records(request).await?.into_inner();

    let mut rows = Vec::new();
    while let Some(row) = stream.next().await {
        rows.push(row?);
    }

    let values: Vec<serde_json::Value> = rows
        .into_iter()
        .map(|r| {
            serde_json::json!({
                "cid": r.cid,
                "name": r.name,
                "version": r.version,
                "schema_version": r.schema_version,
                "created_at": r.oasf_created_at,
            })
        })
        .collect();
    output::print_rows(output, &values)
}
