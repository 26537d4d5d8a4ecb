//! Projects a decoded record into the relational schema and removes it
//! again on delete, relying on `ON DELETE CASCADE` for the child-table
//! cleanup: deleting a record removes all associated rows.

use chrono::Utc;
use dir_types::Record;
use sqlx::SqlitePool;

use crate::error::IndexError;

/// Insert (or replace) the projection of `record`, stored under `cid`.
/// Idempotent for identical content since `cid` is a pure function of the
/// canonical bytes.
pub async fn populate_record(pool: &SqlitePool, cid: &str, record: &Record) -> Result<(), IndexError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now().to_rfc3339();
    let authors_json = serde_json::to_string(&record.authors).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        r#"
        INSERT INTO records (cid, name, version, schema_version, oasf_created_at, authors, signed, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        ON CONFLICT(cid) DO UPDATE SET updated_at = excluded.updated_at
        "#,
    )
    .bind(cid)
    .bind(&record.name)
    .bind(&record.version)
    .bind(&record.schema_version)
    .bind(record.created_at.to_rfc3339())
    .bind(&authors_json)
    .bind(record.signature.is_some())
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    // Re-pushing identical content must not duplicate child rows.
    for table in ["skills", "locators", "modules", "domains"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE record_cid = ?1"))
            .bind(cid)
            .execute(&mut *tx)
            .await?;
    }

    for skill in &record.skills {
        let annotations = serde_json::to_string(&skill.annotations).unwrap_or_else(|_| "{}".into());
        sqlx::query("INSERT INTO skills (record_cid, skill_id, name, annotations) VALUES (?1, ?2, ?3, ?4)")
            .bind(cid)
            .bind(skill.id)
            .bind(&skill.name)
            .bind(&annotations)
            .execute(&mut *tx)
            .await?;
    }

    for locator in &record.locators {
        let annotations = serde_json::to_string(&locator.annotations).unwrap_or_else(|_| "{}".into());
        sqlx::query(
            "INSERT INTO locators (record_cid, type, url, size, digest, annotations) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(cid)
        .bind(&locator.locator_type)
        .bind(&locator.url)
        .bind(locator.size.map(|s| s as i64))
        .bind(&locator.digest)
        .bind(&annotations)
        .execute(&mut *tx)
        .await?;
    }

    for module in &record.modules {
        let data = serde_json::to_string(&module.data).unwrap_or_else(|_| "{}".into());
        let annotations = serde_json::to_string(&module.annotations).unwrap_or_else(|_| "{}".into());
        sqlx::query("INSERT INTO modules (record_cid, name, data, annotations) VALUES (?1, ?2, ?3, ?4)")
            .bind(cid)
            .bind(&module.name)
            .bind(&data)
            .bind(&annotations)
            .execute(&mut *tx)
            .await?;
    }

    for domain in &record.domains {
        sqlx::query("INSERT INTO domains (record_cid, domain_id, name) VALUES (?1, ?2, ?3)")
            .bind(cid)
            .bind(domain.id)
            .bind(&domain.name)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Remove a record and (by cascade) every row that references it.
pub async fn delete_record(pool: &SqlitePool, cid: &str) -> Result<(), IndexError> {
    sqlx::query("DELETE FROM records WHERE cid = ?1").bind(cid).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_schema;
    use crate::test_support::test_pool;
    use dir_types::{Domain, Locator, Module, Skill};
    use std::collections::BTreeMap;

    fn sample() -> Record {
        Record {
            name: "http://example.com/agents/a".into(),
            version: "v4.0.0".into(),
            schema_version: "0.8.0".into(),
            created_at: Utc::now(),
            authors: vec!["alice".into()],
            description: "desc".into(),
            skills: vec![Skill { id: 10201, name: "text-completion".into(), annotations: BTreeMap::new() }],
            locators: vec![Locator {
                locator_type: "docker_image".into(),
                url: "docker.io/x".into(),
                size: None,
                digest: None,
                annotations: BTreeMap::new(),
            }],
            modules: vec![Module { name: "m1".into(), data: serde_json::Map::new(), annotations: BTreeMap::new() }],
            domains: vec![Domain { id: 1, name: "nlp".into() }],
            signature: None,
            annotations: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn delete_cascades_to_children() {
        let pool = test_pool().await;
        init_schema(&pool).await.unwrap();
        let record = sample();
        populate_record(&pool, "cid1", &record).await.unwrap();

        let skill_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills WHERE record_cid = 'cid1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(skill_count, 1);

        delete_record(&pool, "cid1").await.unwrap();

        for table in ["skills", "locators", "modules", "domains"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE record_cid = 'cid1'"))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "{table} should be empty after cascade delete");
        }
    }

    #[tokio::test]
    async fn repopulating_same_cid_does_not_duplicate_rows() {
        let pool = test_pool().await;
        init_schema(&pool).await.unwrap();
        let record = sample();
        populate_record(&pool, "cid1", &record).await.unwrap();
        populate_record(&pool, "cid1", &record).await.unwrap();

        let skill_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM skills WHERE record_cid = 'cid1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(skill_count, 1);
    }
}
