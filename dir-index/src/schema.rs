//! Schema DDL for the relational projection. All child
//! tables cascade-delete with `records`, so a single `DELETE FROM records`
//! removes every associated row in one statement.

use sqlx::SqlitePool;

use crate::error::IndexError;

pub async fn init_schema(pool: &SqlitePool) -> Result<(), IndexError> {
    // SQLite enforces FK constraints per-connection; sqlx's sqlite pool
    // connections share this pragma at acquire time via the pool options,
    // but set it here too so a hand-rolled pool still gets cascade deletes.
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            cid             TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            version         TEXT NOT NULL,
            schema_version  TEXT NOT NULL,
            oasf_created_at TEXT NOT NULL,
            authors         TEXT NOT NULL,
            signed          INTEGER NOT NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            skill_row_id INTEGER PRIMARY KEY AUTOINCREMENT,
            record_cid   TEXT NOT NULL REFERENCES records(cid) ON DELETE CASCADE,
            skill_id     INTEGER NOT NULL,
            name         TEXT NOT NULL,
            annotations  TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS locators (
            locator_row_id INTEGER PRIMARY KEY AUTOINCREMENT,
            record_cid     TEXT NOT NULL REFERENCES records(cid) ON DELETE CASCADE,
            type           TEXT NOT NULL,
            url            TEXT NOT NULL,
            size           INTEGER,
            digest         TEXT,
            annotations    TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS modules (
            module_id   INTEGER PRIMARY KEY AUTOINCREMENT,
            record_cid  TEXT NOT NULL REFERENCES records(cid) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            data        TEXT NOT NULL,
            annotations TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS domains (
            domain_row_id INTEGER PRIMARY KEY AUTOINCREMENT,
            record_cid    TEXT NOT NULL REFERENCES records(cid) ON DELETE CASCADE,
            domain_id     INTEGER NOT NULL,
            name          TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS signature_verifications (
            record_cid        TEXT NOT NULL REFERENCES records(cid) ON DELETE CASCADE,
            signature_digest  TEXT NOT NULL,
            status            TEXT NOT NULL,
            error_message     TEXT,
            signer_type       TEXT,
            signer_issuer     TEXT,
            signer_subject    TEXT,
            signer_public_key TEXT,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL,
            PRIMARY KEY (record_cid, signature_digest)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS name_verifications (
            record_cid TEXT PRIMARY KEY REFERENCES records(cid) ON DELETE CASCADE,
            method     TEXT NOT NULL,
            key_id     TEXT,
            status     TEXT NOT NULL,
            error      TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_skills_record_cid ON skills(record_cid)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_locators_record_cid ON locators(record_cid)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_modules_record_cid ON modules(record_cid)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_domains_record_cid ON domains(record_cid)")
        .execute(pool)
        .await?;

    Ok(())
}
