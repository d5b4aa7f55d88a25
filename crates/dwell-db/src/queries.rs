use crate::Database;
use crate::models::{InquiryRow, PropertyRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

const PROPERTY_COLUMNS: &str = "id, title, description, price, address, detail_address, region, image_url, status, owner_id, created_at";

impl Database {
    // -- Users --

    pub fn insert_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        password_hash: &str,
        phone_number: Option<&str>,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password, phone_number, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, name, email, password_hash, phone_number, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Properties --

    pub fn insert_property(&self, row: &PropertyRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO properties ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    PROPERTY_COLUMNS
                ),
                rusqlite::params![
                    row.id,
                    row.title,
                    row.description,
                    row.price,
                    row.address,
                    row.detail_address,
                    row.region,
                    row.image_url,
                    row.status,
                    row.owner_id,
                    row.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_property(&self, id: &str) -> Result<Option<PropertyRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM properties WHERE id = ?1",
                PROPERTY_COLUMNS
            ))?;
            let row = stmt.query_row([id], property_from_row).optional()?;
            Ok(row)
        })
    }

    /// Overwrite the editable columns. Returns the number of rows touched
    /// (0 when the id does not exist). `owner_id` is never written.
    pub fn update_property_row(&self, row: &PropertyRow) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE properties
                 SET title = ?2, description = ?3, price = ?4, address = ?5,
                     detail_address = ?6, region = ?7, image_url = ?8, status = ?9
                 WHERE id = ?1",
                rusqlite::params![
                    row.id,
                    row.title,
                    row.description,
                    row.price,
                    row.address,
                    row.detail_address,
                    row.region,
                    row.image_url,
                    row.status,
                ],
            )?;
            Ok(changed)
        })
    }

    pub fn query_properties(&self, region: Option<&str>) -> Result<Vec<PropertyRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM properties
                 WHERE ?1 IS NULL OR instr(region, ?1) > 0
                 ORDER BY created_at DESC, rowid DESC",
                PROPERTY_COLUMNS
            ))?;
            let rows = stmt
                .query_map([region], property_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Inquiries --

    pub fn insert_inquiry(
        &self,
        id: &str,
        content: &str,
        property_id: &str,
        user_id: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO inquiries (id, content, property_id, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, content, property_id, user_id, created_at],
            )?;
            Ok(())
        })
    }

    /// Fetch an inquiry and its parent listing in one query.
    pub fn get_inquiry_with_property(&self, id: &str) -> Result<Option<(InquiryRow, PropertyRow)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.id, i.content, i.answer, i.property_id, i.user_id, u.name, i.created_at,
                        p.id, p.title, p.description, p.price, p.address, p.detail_address,
                        p.region, p.image_url, p.status, p.owner_id, p.created_at
                 FROM inquiries i
                 JOIN properties p ON i.property_id = p.id
                 LEFT JOIN users u ON i.user_id = u.id
                 WHERE i.id = ?1",
            )?;

            let row = stmt
                .query_row([id], |row| {
                    let inquiry = inquiry_from_row(row)?;
                    let property = PropertyRow {
                        id: row.get(7)?,
                        title: row.get(8)?,
                        description: row.get(9)?,
                        price: row.get(10)?,
                        address: row.get(11)?,
                        detail_address: row.get(12)?,
                        region: row.get(13)?,
                        image_url: row.get(14)?,
                        status: row.get(15)?,
                        owner_id: row.get(16)?,
                        created_at: row.get(17)?,
                    };
                    Ok((inquiry, property))
                })
                .optional()?;
            Ok(row)
        })
    }

    /// Replace the answer on an inquiry. Returns the number of rows touched.
    pub fn update_answer(&self, id: &str, answer: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE inquiries SET answer = ?2 WHERE id = ?1",
                rusqlite::params![id, answer],
            )?;
            Ok(changed)
        })
    }

    pub fn get_inquiries_for_property(&self, property_id: &str) -> Result<Vec<InquiryRow>> {
        self.with_conn(|conn| {
            // JOIN users to fetch the asker name in a single query
            let mut stmt = conn.prepare(
                "SELECT i.id, i.content, i.answer, i.property_id, i.user_id, u.name, i.created_at
                 FROM inquiries i
                 LEFT JOIN users u ON i.user_id = u.id
                 WHERE i.property_id = ?1
                 ORDER BY i.created_at DESC, i.rowid DESC",
            )?;
            let rows = stmt
                .query_map([property_id], inquiry_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, email, password, phone_number, created_at FROM users WHERE {} = ?1",
        column
    ))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                phone_number: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn property_from_row(row: &Row<'_>) -> rusqlite::Result<PropertyRow> {
    Ok(PropertyRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        address: row.get(4)?,
        detail_address: row.get(5)?,
        region: row.get(6)?,
        image_url: row.get(7)?,
        status: row.get(8)?,
        owner_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn inquiry_from_row(row: &Row<'_>) -> rusqlite::Result<InquiryRow> {
    Ok(InquiryRow {
        id: row.get(0)?,
        content: row.get(1)?,
        answer: row.get(2)?,
        property_id: row.get(3)?,
        user_id: row.get(4)?,
        asker_name: row
            .get::<_, Option<String>>(5)?
            .unwrap_or_else(|| "unknown".to_string()),
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
