use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL,
            email               TEXT NOT NULL UNIQUE,
            type                TEXT NOT NULL CHECK (type IN ('homeowner', 'tradesperson')),
            avatar              TEXT,
            location            TEXT,
            trades              TEXT NOT NULL DEFAULT '[]',
            rating              REAL,
            reviews             INTEGER,
            verified            INTEGER,
            credits             REAL,
            membership_type     TEXT,
            membership_expiry   TEXT,
            verification_status TEXT,
            verification_data   TEXT,
            account_status      TEXT NOT NULL DEFAULT 'active',
            parked_date         TEXT,
            reactivated_date    TEXT,
            working_area        TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_users_verification_session
            ON users(json_extract(verification_data, '$.session_id'));

        CREATE TABLE IF NOT EXISTS credentials (
            user_id     TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS job_leads (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            category        TEXT NOT NULL,
            location        TEXT NOT NULL,
            budget          TEXT NOT NULL,
            urgency         TEXT NOT NULL CHECK (urgency IN ('Low', 'Medium', 'High')),
            posted_by       TEXT NOT NULL REFERENCES users(id),
            posted_date     TEXT NOT NULL,
            contact_details TEXT NOT NULL,
            purchased_by    TEXT NOT NULL DEFAULT '[]',
            max_purchases   INTEGER NOT NULL DEFAULT 6,
            price           REAL NOT NULL DEFAULT 9.99,
            interests       TEXT NOT NULL DEFAULT '[]',
            is_active       INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_job_leads_posted
            ON job_leads(posted_date);

        CREATE TABLE IF NOT EXISTS quote_requests (
            id                  TEXT PRIMARY KEY,
            homeowner_id        TEXT NOT NULL REFERENCES users(id),
            homeowner_name      TEXT NOT NULL,
            project_title       TEXT NOT NULL,
            project_description TEXT NOT NULL,
            category            TEXT NOT NULL,
            location            TEXT NOT NULL,
            budget              TEXT NOT NULL,
            urgency             TEXT NOT NULL CHECK (urgency IN ('Low', 'Medium', 'High')),
            contact_details     TEXT NOT NULL,
            responses           TEXT NOT NULL DEFAULT '[]',
            max_responses       INTEGER NOT NULL DEFAULT 5,
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
