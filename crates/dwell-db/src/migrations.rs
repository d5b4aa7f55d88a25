use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            password      TEXT NOT NULL,
            phone_number  TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS properties (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            price           REAL NOT NULL CHECK (price >= 0),
            address         TEXT NOT NULL,
            detail_address  TEXT,
            region          TEXT NOT NULL,
            image_url       TEXT,
            status          TEXT NOT NULL DEFAULT 'AVAILABLE'
                                CHECK (status IN ('AVAILABLE', 'SOLD')),
            owner_id        TEXT NOT NULL REFERENCES users(id),
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_properties_created
            ON properties(created_at);

        CREATE TABLE IF NOT EXISTS inquiries (
            id           TEXT PRIMARY KEY,
            content      TEXT NOT NULL,
            answer       TEXT,
            property_id  TEXT NOT NULL REFERENCES properties(id),
            user_id      TEXT NOT NULL REFERENCES users(id),
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_inquiries_property
            ON inquiries(property_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
