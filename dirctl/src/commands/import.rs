//! `import --type mcp --url URL`: fetches a list of MCP server descriptors
//! and pushes one record per entry. Only `--type mcp` is implemented; other
//! importer types are rejected up front rather than silently ignored.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use dir_proto::dir::v1::PushChunk;
use serde::Deserialize;

use crate::client;

#[derive(Debug, Deserialize)]
struct McpServerEntry {
    name: String,
    #[serde(default)]
    description: String,
    url: String,
}

/// `--enrich-config`'s YAML shape: plain key/value annotations merged into
/// every imported record, e.g. a source label or a fetch timestamp tag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnrichConfig {
    annotations: BTreeMap<String, String>,
}

pub async fn run(
    server: &str,
    import_type: &str,
    url: &str,
    limit: Option<usize>,
    enrich_config: Option<PathBuf>,
) -> anyhow::Result<()> {
    if import_type != "mcp" {
        anyhow::bail!("unsupported import type {import_type:?}; only \"mcp\" is supported");
    }

    let enrich = match enrich_config {
        Some(path) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            serde_yaml::from_str(&raw)?
        }
        None => EnrichConfig::default(),
    };

    let entries: Vec<McpServerEntry> = reqwest::get(url).await?.error_for_status()?.json().await?;
    let entries = match limit {
        Some(limit) => &entries[..entries.len().min(limit)],
        None => &entries[..],
    };

    let mut client = client::store(server).await?;
    let mut imported = 0usize;
    for entry in entries {
        let record = dir_types::Record {
            name: entry.url.clone(),
            version: "v1.0.0".to_string(),
            schema_version: "v1alpha2".to_string(),
            created_at: Utc::now(),
            authors: Vec::new(),
            description: entry.description.clone(),
            skills: Vec::new(),
            locators: vec![dir_types::Locator {
                locator_type: "mcp_server".to_string(),
                url: entry.url.clone(),
                size: None,
                digest: None,
                annotations: BTreeMap::new(),
            }],
            modules: Vec::new(),
            domains: Vec::new(),
            signature: None,
            annotations: enrich.annotations.clone(),
        };

        let bytes = serde_json::to_vec(&record)?;
        let response = client.push(tokio_stream::once(PushChunk { data: bytes })).await?.into_inner();
        println!("{} -> {}", entry.name, response.cid);
        imported += 1;
    }

    println!("imported {imported} record(s)");
    Ok(())
}
