//! `naming verify`, `naming check`.

use dir_proto::dir::v1::NamingVerifyRequest;

use crate::client;
use crate::output::{self, OutputFormat};
use crate::reference::{self, Reference};

async fn resolve_cid(server: &str, raw_ref: &str) -> anyhow::Result<String> {
    reference::resolve(server, &Reference::parse(raw_ref)?).await
}

pub async fn verify(server: &str, raw_ref: &str, output: OutputFormat) -> anyhow::Result<()> {
    let cid = resolve_cid(server, raw_ref).await?;
    let mut client = client::naming(server).await?;
    let response = client.verify(NamingVerifyRequest { cid }).await?.into_inner();
    print_response(output, response)
}

pub async fn check(server: &str, raw_ref: &str, output: OutputFormat) -> anyhow::Result<()> {
    let cid = resolve_cid(server, raw_ref).await?;
    let mut client = client::naming(server).await?;
    let response = client.check(NamingVerifyRequest { cid }).await?.into_inner();
    print_response(output, response)
}

fn print_response(output: OutputFormat, response: dir_proto::dir::v1::NamingVerifyResponse) -> anyhow::Result<()> {
    output::print_value(
        output,
        &serde_json::json!({
            "verified": response.verified,
            "method": response.method,
            "key_id": response.key_id,
            "error": response.error,
        }),
    )
}
