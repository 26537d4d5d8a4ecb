//! Parses the CLI's reference syntax — `<CID>`, `<NAME>`, `<NAME>:<VERSION>`,
//! `<NAME>@<CID>`, `<NAME>:<VERSION>@<CID>` — and resolves a name-shaped
//! reference to a CID through the `Search` RPC, picking the newest
//! `created_at` when a name resolves to more than one version.

use std::str::FromStr;

use anyhow::{anyhow, bail};
use dir_proto::dir::v1::SearchRequest;
use dir_types::RecordCid;

#[derive(Debug, Clone)]
pub enum Reference {
    Cid(String),
    Name { name: String, version: Option<String>, assert_cid: Option<String> },
}

impl Reference {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        if RecordCid::from_str(raw).is_ok() {
            return Ok(Reference::Cid(raw.to_string()));
        }

        let (body, assert_cid) = match raw.rsplit_once('@') {
            Some((prefix, suffix)) if RecordCid::from_str(suffix).is_ok() => (prefix, Some(suffix.to_string())),
            _ => (raw, None),
        };

        let (name, version) = split_name_version(body);
        Ok(Reference::Name { name: name.to_string(), version, assert_cid })
    }
}

/// Finds the rightmost `:` that does not open a URL scheme (i.e. is not
/// immediately followed by `//`) and treats everything after it as the
/// version suffix.
fn split_name_version(body: &str) -> (&str, Option<String>) {
    for (idx, _) in body.match_indices(':').collect::<Vec<_>>().into_iter().rev() {
        if body[idx + 1..].starts_with("//") {
            continue;
        }
        return (&body[..idx], Some(body[idx + 1..].to_string()));
    }
    (body, None)
}

/// Resolves a parsed reference to a concrete CID, asserting hash equality
/// when the reference carried an `@<CID>` suffix.
pub async fn resolve(server: &str, reference: &Reference) -> anyhow::Result<String> {
    let cid = match reference {
        Reference::Cid(cid) => cid.clone(),
        Reference::Name { name, version, assert_cid } => {
            let mut client = crate::client::search(server).await?;
            let request = SearchRequest {
                names: vec![name.clone()],
                versions: version.clone().into_iter().collect(),
                limit: 100,
                ..Default::default()
            };
            let mut stream = client.get_records(request).await?.into_inner();

            let mut best: Option<(String, String)> = None;
            use futures::StreamExt;
            while let Some(row) = stream.next().await {
                let row = row?;
                let newer = match &best {
                    Some((_, created_at)) => row.oasf_created_at > *created_at,
                    None => true,
                };
                if newer {
                    best = Some((row.cid, row.oasf_created_at));
                }
            }

            let (cid, _) = best.ok_or_else(|| anyhow!("no record found matching name {name:?}"))?;
            if let Some(expected) = assert_cid {
                if &cid != expected {
                    bail!("hash mismatch: requested {expected}, resolved content is {cid}");
                }
            }
            cid
        }
    };
    Ok(cid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_name() {
        let r = Reference::parse("http://example.com/agents/a").unwrap();
        match r {
            Reference::Name { name, version, assert_cid } => {
                assert_eq!(name, "http://example.com/agents/a");
                assert_eq!(version, None);
                assert_eq!(assert_cid, None);
            }
            Reference::Cid(_) => panic!("expected name"),
        }
    }

    #[test]
    fn parses_name_with_version() {
        let r = Reference::parse("http://H/p:v4.0.0").unwrap();
        match r {
            Reference::Name { name, version, .. } => {
                assert_eq!(name, "http://H/p");
                assert_eq!(version.as_deref(), Some("v4.0.0"));
            }
            Reference::Cid(_) => panic!("expected name"),
        }
    }
}
