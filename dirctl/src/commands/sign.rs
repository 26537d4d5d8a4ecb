//! `sign`, `verify`.

use dir_proto::dir::v1::{SignRequest, VerifySignatureRequest};

use crate::client;
use crate::output::{self, OutputFormat};

pub async fn sign(server: &str, cid: &str, key_path: &str) -> anyhow::Result<()> {
    let mut client = client::sign(server).await?;
    let response = client
        .sign(SignRequest { cid: cid.to_string(), key_path: key_path.to_string() })
        .await?
        .into_inner();
    println!("{}", response.cid);
    Ok(())
}

pub async fn verify(server: &str, cid: &str, output: OutputFormat) -> anyhow::Result<()> {
    let mut client = client::sign(server).await?;
    let response = client.verify(VerifySignatureRequest { cid: cid.to_string() }).await?.into_inner();
    output::print_value(output, &serde_json::json!({ "verified": response.verified, "error": response.error }))
}
