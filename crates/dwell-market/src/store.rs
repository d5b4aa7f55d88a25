use chrono::{DateTime, Utc};
use uuid::Uuid;

use dwell_types::models::{Inquiry, Property, User};

/// An account together with its stored password hash. Only sign-in needs the
/// hash, so it is kept off [`User`].
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction so the marketplace policy can be exercised without a
/// database. Implementations must report unique-key violations as
/// [`StoreError::Conflict`].
pub trait MarketStore: Send + Sync {
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    fn find_user(&self, id: &Uuid) -> Result<Option<User>, StoreError>;
    fn create_user(&self, user: &NewUser) -> Result<(), StoreError>;

    fn create_property(&self, property: &Property) -> Result<(), StoreError>;
    fn find_property(&self, id: &Uuid) -> Result<Option<Property>, StoreError>;
    /// Writes every mutable column of `property`. `owner_id` and `created_at`
    /// are never touched.
    fn update_property(&self, property: &Property) -> Result<(), StoreError>;
    /// Newest first. `region` narrows to rows whose region contains it.
    fn list_properties(&self, region: Option<&str>) -> Result<Vec<Property>, StoreError>;

    fn create_inquiry(&self, inquiry: &Inquiry) -> Result<(), StoreError>;
    fn find_inquiry_with_property(
        &self,
        id: &Uuid,
    ) -> Result<Option<(Inquiry, Property)>, StoreError>;
    fn set_answer(&self, inquiry_id: &Uuid, answer: &str) -> Result<(), StoreError>;
    /// Newest first, each paired with the asker's display name.
    fn list_inquiries(&self, property_id: &Uuid) -> Result<Vec<(Inquiry, String)>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
