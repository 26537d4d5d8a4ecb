//! `GetRecords`/`GetRecordCIDs`. Wildcard, author, and ID
//! filters are pushed into SQL (`GLOB` and `EXISTS` subqueries, so joins
//! never multiply rows); comparison filters on `versions`/`schema_versions`/
//! `created_ats` are evaluated in Rust afterward since semver-aware
//! comparison has no SQL equivalent. Final ordering and `limit`/`offset`
//! are applied after that pass.

use sqlx::{Row, SqlitePool};

use crate::error::IndexError;
use crate::filter::{matches_comparison, matches_timestamp, CompareOp, ComparisonTerm, SearchFilter};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordSummary {
    pub cid: String,
    pub name: String,
    pub version: String,
    pub schema_version: String,
    pub oasf_created_at: String,
    pub created_at: String,
}

fn push_glob_or(clauses: &mut Vec<String>, binds: &mut Vec<String>, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let ors: Vec<String> = values
        .iter()
        .map(|v| {
            binds.push(v.clone());
            format!("{column} GLOB ?")
        })
        .collect();
    clauses.push(format!("({})", ors.join(" OR ")));
}

/// `authors` is stored as a JSON array on `records` itself (it has no child
/// table), so each element is GLOB-matched directly via `json_each` rather
/// than against the column's serialized JSON text — the same anchored
/// wildcard semantics as every other string field, applied per-author.
fn push_authors_glob_exists(clauses: &mut Vec<String>, binds: &mut Vec<String>, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let ors: Vec<String> = values
        .iter()
        .map(|v| {
            binds.push(v.clone());
            "author.value GLOB ?".to_string()
        })
        .collect();
    clauses.push(format!(
        "EXISTS (SELECT 1 FROM json_each(records.authors) author WHERE ({}))",
        ors.join(" OR ")
    ));
}

fn push_child_glob_exists(
    clauses: &mut Vec<String>,
    binds: &mut Vec<String>,
    table: &str,
    column: &str,
    values: &[String],
) {
    if values.is_empty() {
        return;
    }
    let ors: Vec<String> = values
        .iter()
        .map(|v| {
            binds.push(v.clone());
            format!("{column} GLOB ?")
        })
        .collect();
    clauses.push(format!(
        "EXISTS (SELECT 1 FROM {table} t WHERE t.record_cid = records.cid AND ({}))",
        ors.join(" OR ")
    ));
}

/// Run `filter` against the index and return matching CIDs, ordered and
/// paginated (`records.created_at DESC`, ties broken by
/// CID ascending).
pub async fn search(pool: &SqlitePool, filter: &SearchFilter) -> Result<Vec<RecordSummary>, IndexError> {
    filter.validate()?;

    // GLOB/EXISTS clauses and their string binds are built up together so
    // the final bind order always matches the `?` placeholders in `clauses`
    // left to right; ID filters run as separate queries below instead of
    // sharing this bind list, since they need integer binds.
    let mut clauses: Vec<String> = Vec::new();
    let mut string_binds: Vec<String> = Vec::new();

    push_glob_or(&mut clauses, &mut string_binds, "records.name", &filter.names);
    push_authors_glob_exists(&mut clauses, &mut string_binds, &filter.authors);
    push_child_glob_exists(&mut clauses, &mut string_binds, "skills", "name", &filter.skill_names);
    push_child_glob_exists(&mut clauses, &mut string_binds, "locators", "type", &filter.locator_types);
    push_child_glob_exists(&mut clauses, &mut string_binds, "locators", "url", &filter.locator_urls);
    push_child_glob_exists(&mut clauses, &mut string_binds, "modules", "name", &filter.module_names);
    push_child_glob_exists(&mut clauses, &mut string_binds, "domains", "name", &filter.domain_names);

    // Ordered filters accept both a comparison-prefixed term (`>=v3.0.0`)
    // and a bare wildcard pattern (`v[^4].0.0`); a term with no recognized
    // prefix is a glob match pushed into SQL like any other wildcard field,
    // while `>`/`>=`/`<`/`<=` terms have no SQL equivalent for semver-aware
    // ordering and are evaluated in Rust after the query returns.
    let mut version_cmp_terms = Vec::new();
    let mut version_globs = Vec::new();
    for raw in &filter.versions {
        let term = ComparisonTerm::parse(raw);
        if term.op == CompareOp::Eq {
            version_globs.push(term.value);
        } else {
            version_cmp_terms.push(term);
        }
    }
    push_glob_or(&mut clauses, &mut string_binds, "records.version", &version_globs);

    let mut schema_version_cmp_terms = Vec::new();
    let mut schema_version_globs = Vec::new();
    for raw in &filter.schema_versions {
        let term = ComparisonTerm::parse(raw);
        if term.op == CompareOp::Eq {
            schema_version_globs.push(term.value);
        } else {
            schema_version_cmp_terms.push(term);
        }
    }
    push_glob_or(&mut clauses, &mut string_binds, "records.schema_version", &schema_version_globs);

    let mut created_at_cmp_terms = Vec::new();
    let mut created_at_globs = Vec::new();
    for raw in &filter.created_ats {
        let term = ComparisonTerm::parse(raw);
        if term.op == CompareOp::Eq {
            created_at_globs.push(term.value);
        } else {
            created_at_cmp_terms.push(term);
        }
    }
    push_glob_or(&mut clauses, &mut string_binds, "records.oasf_created_at", &created_at_globs);

    if let Some(verified) = filter.verified {
        if verified {
            clauses.push(
                "EXISTS (SELECT 1 FROM name_verifications nv WHERE nv.record_cid = records.cid AND nv.status = 'verified')"
                    .to_string(),
            );
        } else {
            clauses.push(
                "NOT EXISTS (SELECT 1 FROM name_verifications nv WHERE nv.record_cid = records.cid AND nv.status = 'verified')"
                    .to_string(),
            );
        }
    }

    let mut sql = "SELECT cid, name, version, schema_version, oasf_created_at, created_at FROM records".to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let mut query = sqlx::query(&sql);
    for bind in &string_binds {
        query = query.bind(bind);
    }

    let rows = query.fetch_all(pool).await?;
    let mut candidates: Vec<RecordSummary> = rows
        .into_iter()
        .map(|row| RecordSummary {
            cid: row.get("cid"),
            name: row.get("name"),
            version: row.get("version"),
            schema_version: row.get("schema_version"),
            oasf_created_at: row.get("oasf_created_at"),
            created_at: row.get("created_at"),
        })
        .collect();

    // ID filters against skills/modules/domains, applied as a second pass
    // so the i64 and String bind lists for the main query never need
    // interleaving.
    for (table, column, ids) in [
        ("skills", "skill_id", &filter.skill_ids),
        ("modules", "module_id", &filter.module_ids),
        ("domains", "domain_id", &filter.domain_ids),
    ] {
        if ids.is_empty() {
            continue;
        }
        let placeholders: Vec<String> = ids.iter().map(|_| "?".to_string()).collect();
        let id_sql = format!(
            "SELECT DISTINCT record_cid FROM {table} WHERE {column} IN ({})",
            placeholders.join(", ")
        );
        let mut q = sqlx::query(&id_sql);
        for id in ids {
            q = q.bind(id);
        }
        let matching: std::collections::HashSet<String> =
            q.fetch_all(pool).await?.into_iter().map(|r| r.get::<String, _>("record_cid")).collect();
        candidates.retain(|c| matching.contains(&c.cid));
    }

    // Comparison-operator terms (semver/lexicographic/RFC-3339), OR'd
    // within a field, applied in Rust since SQL has no semver comparator.
    if !version_cmp_terms.is_empty() {
        candidates.retain(|c| version_cmp_terms.iter().any(|t| matches_comparison(t, &c.version)));
    }
    if !schema_version_cmp_terms.is_empty() {
        candidates.retain(|c| schema_version_cmp_terms.iter().any(|t| matches_comparison(t, &c.schema_version)));
    }
    if !created_at_cmp_terms.is_empty() {
        candidates.retain(|c| created_at_cmp_terms.iter().any(|t| matches_timestamp(t, &c.oasf_created_at)));
    }

    // Default ordering: created_at DESC, ties broken by CID ascending
    // Distinct over record_cid already holds
    // since every clause above is an EXISTS/IN membership test, never a
    // join that could multiply rows.
    candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.cid.cmp(&b.cid)));

    let offset = filter.offset as usize;
    let limit = filter.limit as usize;
    let page = candidates.into_iter().skip(offset).take(limit).collect();
    Ok(page)
}

pub async fn search_cids(pool: &SqlitePool, filter: &SearchFilter) -> Result<Vec<String>, IndexError> {
    Ok(search(pool, filter).await?.into_iter().map(|r| r.cid).collect())
}
