//! `MarketStore` over SQLite: row ↔ model conversion and error mapping.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::ffi;
use tracing::warn;
use uuid::Uuid;

use dwell_market::store::{MarketStore, NewUser, StoreError, UserRecord};
use dwell_types::models::{Inquiry, Property, PropertyStatus, User};

use crate::Database;
use crate::models::{InquiryRow, PropertyRow, UserRow};

/// Fixed-width timestamps so `ORDER BY created_at` sorts chronologically.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str, id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; treat as naive UTC.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on row '{}': {}", raw, id, e);
            DateTime::default()
        })
}

fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, raw, e);
        Uuid::default()
    })
}

/// Unique and primary-key violations become `Conflict`; everything else is
/// an opaque store failure.
fn map_err(e: anyhow::Error) -> StoreError {
    if let Some(rusqlite::Error::SqliteFailure(err, _)) = e.downcast_ref::<rusqlite::Error>() {
        if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
            || err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        {
            return StoreError::Conflict;
        }
    }
    StoreError::Unavailable(e.to_string())
}

fn user_from_row(row: UserRow) -> UserRecord {
    UserRecord {
        user: User {
            id: parse_id(&row.id, "user id"),
            created_at: parse_timestamp(&row.created_at, &row.id),
            name: row.name,
            email: row.email,
            phone_number: row.phone_number,
        },
        password_hash: row.password,
    }
}

fn property_to_row(property: &Property) -> PropertyRow {
    PropertyRow {
        id: property.id.to_string(),
        title: property.title.clone(),
        description: property.description.clone(),
        price: property.price,
        address: property.address.clone(),
        detail_address: property.detail_address.clone(),
        region: property.region.clone(),
        image_url: property.image_url.clone(),
        status: property.status.as_str().to_string(),
        owner_id: property.owner_id.to_string(),
        created_at: format_timestamp(&property.created_at),
    }
}

fn property_from_row(row: PropertyRow) -> Property {
    let status = row.status.parse::<PropertyStatus>().unwrap_or_else(|e| {
        warn!("{} on property '{}'", e, row.id);
        PropertyStatus::Available
    });
    Property {
        id: parse_id(&row.id, "property id"),
        owner_id: parse_id(&row.owner_id, "owner_id"),
        created_at: parse_timestamp(&row.created_at, &row.id),
        status,
        title: row.title,
        description: row.description,
        price: row.price,
        address: row.address,
        detail_address: row.detail_address,
        region: row.region,
        image_url: row.image_url,
    }
}

fn inquiry_from_row(row: InquiryRow) -> (Inquiry, String) {
    let inquiry = Inquiry {
        id: parse_id(&row.id, "inquiry id"),
        property_id: parse_id(&row.property_id, "property_id"),
        user_id: parse_id(&row.user_id, "user_id"),
        created_at: parse_timestamp(&row.created_at, &row.id),
        content: row.content,
        answer: row.answer,
    };
    (inquiry, row.asker_name)
}

impl MarketStore for Database {
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.get_user_by_email(email).map_err(map_err)?.map(user_from_row))
    }

    fn find_user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .get_user_by_id(&id.to_string())
            .map_err(map_err)?
            .map(|row| user_from_row(row).user))
    }

    fn create_user(&self, user: &NewUser) -> Result<(), StoreError> {
        self.insert_user(
            &user.id.to_string(),
            &user.name,
            &user.email,
            &user.password_hash,
            user.phone_number.as_deref(),
            &format_timestamp(&user.created_at),
        )
        .map_err(map_err)
    }

    fn create_property(&self, property: &Property) -> Result<(), StoreError> {
        self.insert_property(&property_to_row(property)).map_err(map_err)
    }

    fn find_property(&self, id: &Uuid) -> Result<Option<Property>, StoreError> {
        Ok(self
            .get_property(&id.to_string())
            .map_err(map_err)?
            .map(property_from_row))
    }

    fn update_property(&self, property: &Property) -> Result<(), StoreError> {
        match self.update_property_row(&property_to_row(property)).map_err(map_err)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    fn list_properties(&self, region: Option<&str>) -> Result<Vec<Property>, StoreError> {
        Ok(self.query_properties(region)
            .map_err(map_err)?
            .into_iter()
            .map(property_from_row)
            .collect())
    }

    fn create_inquiry(&self, inquiry: &Inquiry) -> Result<(), StoreError> {
        self.insert_inquiry(
            &inquiry.id.to_string(),
            &inquiry.content,
            &inquiry.property_id.to_string(),
            &inquiry.user_id.to_string(),
            &format_timestamp(&inquiry.created_at),
        )
        .map_err(map_err)
    }

    fn find_inquiry_with_property(
        &self,
        id: &Uuid,
    ) -> Result<Option<(Inquiry, Property)>, StoreError> {
        Ok(self
            .get_inquiry_with_property(&id.to_string())
            .map_err(map_err)?
            .map(|(inquiry, property)| (inquiry_from_row(inquiry).0, property_from_row(property))))
    }

    fn set_answer(&self, inquiry_id: &Uuid, answer: &str) -> Result<(), StoreError> {
        match self.update_answer(&inquiry_id.to_string(), answer).map_err(map_err)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    fn list_inquiries(&self, property_id: &Uuid) -> Result<Vec<(Inquiry, String)>, StoreError> {
        Ok(self
            .get_inquiries_for_property(&property_id.to_string())
            .map_err(map_err)?
            .into_iter()
            .map(inquiry_from_row)
            .collect())
    }
}
