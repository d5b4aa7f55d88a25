//! Database row types. These map directly to SQLite rows.
//! Distinct from dwell-types models to keep the DB layer independent;
//! conversion happens in `store.rs`.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub created_at: String,
}

pub struct PropertyRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub address: String,
    pub detail_address: Option<String>,
    pub region: String,
    pub image_url: Option<String>,
    pub status: String,
    pub owner_id: String,
    pub created_at: String,
}

pub struct InquiryRow {
    pub id: String,
    pub content: String,
    pub answer: Option<String>,
    pub property_id: String,
    pub user_id: String,
    pub asker_name: String,
    pub created_at: String,
}
