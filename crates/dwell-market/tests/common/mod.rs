#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use dwell_market::store::{MarketStore, NewUser, StoreError, UserRecord};
use dwell_market::{Identity, Marketplace, RawForm, ViewInvalidator};
use dwell_types::events::StaleView;
use dwell_types::models::{Inquiry, Property, User};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
    properties: Mutex<Vec<Property>>,
    inquiries: Mutex<Vec<Inquiry>>,
    /// When set, updates and inquiry writes fail with this error.
    failing_writes: Mutex<Option<fn() -> StoreError>>,
}

impl MemoryStore {
    /// Keep reads working but fail every later update and inquiry write.
    pub fn fail_writes_with(&self, error: fn() -> StoreError) {
        *self.failing_writes.lock().unwrap() = Some(error);
    }

    fn check_write(&self) -> Result<(), StoreError> {
        match *self.failing_writes.lock().unwrap() {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }

    pub fn property_count(&self) -> usize {
        self.properties.lock().unwrap().len()
    }

    pub fn property(&self, id: &Uuid) -> Property {
        self.find_property(id).unwrap().expect("property stored")
    }

    pub fn inquiry(&self, id: &Uuid) -> Inquiry {
        self.inquiries
            .lock()
            .unwrap()
            .iter()
            .find(|i| &i.id == id)
            .cloned()
            .expect("inquiry stored")
    }
}

impl MarketStore for MemoryStore {
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|r| r.user.email == email)
            .cloned())
    }

    fn find_user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(id).map(|r| r.user.clone()))
    }

    fn create_user(&self, user: &NewUser) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|r| r.user.email == user.email) {
            return Err(StoreError::Conflict);
        }
        users.insert(
            user.id,
            UserRecord {
                user: User {
                    id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    phone_number: user.phone_number.clone(),
                    created_at: user.created_at,
                },
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(())
    }

    fn create_property(&self, property: &Property) -> Result<(), StoreError> {
        self.properties.lock().unwrap().push(property.clone());
        Ok(())
    }

    fn find_property(&self, id: &Uuid) -> Result<Option<Property>, StoreError> {
        Ok(self
            .properties
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    fn update_property(&self, property: &Property) -> Result<(), StoreError> {
        self.check_write()?;
        let mut properties = self.properties.lock().unwrap();
        let stored = properties
            .iter_mut()
            .find(|p| p.id == property.id)
            .ok_or(StoreError::NotFound)?;
        let owner_id = stored.owner_id;
        let created_at = stored.created_at;
        *stored = Property {
            owner_id,
            created_at,
            ..property.clone()
        };
        Ok(())
    }

    fn list_properties(&self, region: Option<&str>) -> Result<Vec<Property>, StoreError> {
        let mut rows: Vec<Property> = self
            .properties
            .lock()
            .unwrap()
            .iter()
            .filter(|p| region.is_none_or(|r| p.region.contains(r)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn create_inquiry(&self, inquiry: &Inquiry) -> Result<(), StoreError> {
        self.check_write()?;
        self.inquiries.lock().unwrap().push(inquiry.clone());
        Ok(())
    }

    fn find_inquiry_with_property(
        &self,
        id: &Uuid,
    ) -> Result<Option<(Inquiry, Property)>, StoreError> {
        let inquiry = self
            .inquiries
            .lock()
            .unwrap()
            .iter()
            .find(|i| &i.id == id)
            .cloned();
        match inquiry {
            Some(inquiry) => {
                let property = self
                    .find_property(&inquiry.property_id)?
                    .ok_or(StoreError::NotFound)?;
                Ok(Some((inquiry, property)))
            }
            None => Ok(None),
        }
    }

    fn set_answer(&self, inquiry_id: &Uuid, answer: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let mut inquiries = self.inquiries.lock().unwrap();
        let inquiry = inquiries
            .iter_mut()
            .find(|i| &i.id == inquiry_id)
            .ok_or(StoreError::NotFound)?;
        inquiry.answer = Some(answer.to_string());
        Ok(())
    }

    fn list_inquiries(&self, property_id: &Uuid) -> Result<Vec<(Inquiry, String)>, StoreError> {
        let users = self.users.lock().unwrap();
        let mut rows: Vec<(Inquiry, String)> = self
            .inquiries
            .lock()
            .unwrap()
            .iter()
            .filter(|i| &i.property_id == property_id)
            .map(|i| {
                let name = users
                    .get(&i.user_id)
                    .map(|r| r.user.name.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                (i.clone(), name)
            })
            .collect();
        rows.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        Ok(rows)
    }
}

/// Store whose every call fails, for persistence-error paths.
pub struct UnavailableStore;

impl MarketStore for UnavailableStore {
    fn find_user_by_email(&self, _: &str) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn find_user(&self, _: &Uuid) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn create_user(&self, _: &NewUser) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn create_property(&self, _: &Property) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn find_property(&self, _: &Uuid) -> Result<Option<Property>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn update_property(&self, _: &Property) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn list_properties(&self, _: Option<&str>) -> Result<Vec<Property>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn create_inquiry(&self, _: &Inquiry) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn find_inquiry_with_property(
        &self,
        _: &Uuid,
    ) -> Result<Option<(Inquiry, Property)>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn set_answer(&self, _: &Uuid, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
    fn list_inquiries(&self, _: &Uuid) -> Result<Vec<(Inquiry, String)>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
}

#[derive(Default)]
pub struct RecordingViews {
    marks: Mutex<Vec<StaleView>>,
}

impl RecordingViews {
    pub fn take(&self) -> Vec<StaleView> {
        std::mem::take(&mut *self.marks.lock().unwrap())
    }
}

impl ViewInvalidator for RecordingViews {
    fn mark_stale(&self, view: StaleView) {
        self.marks.lock().unwrap().push(view);
    }
}

pub type TestMarket = Marketplace<MemoryStore, RecordingViews>;

pub fn build_market() -> (TestMarket, Arc<MemoryStore>, Arc<RecordingViews>) {
    let store = Arc::new(MemoryStore::default());
    let views = Arc::new(RecordingViews::default());
    (Marketplace::new(store.clone(), views.clone()), store, views)
}

pub fn form(pairs: &[(&str, &str)]) -> RawForm {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn identity(name: &str) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn listing_form() -> RawForm {
    form(&[
        ("title", "Riverside two-room"),
        ("description", "Bright two-room flat, five minutes to the subway"),
        ("price", "42000"),
        ("address", "34 Hangang-daero"),
        ("region", "서울 용산구"),
    ])
}

pub fn listing_form_with(key: &str, value: &str) -> RawForm {
    let mut raw = listing_form();
    raw.insert(key.to_string(), value.to_string());
    raw
}

/// Create a listing owned by `owner` and return its id.
pub fn seed_property(market: &TestMarket, store: &MemoryStore, owner: &Identity) -> Uuid {
    market
        .create_property(Some(owner), &listing_form())
        .expect("owner can create listing");
    store
        .list_properties(None)
        .unwrap()
        .into_iter()
        .find(|p| p.owner_id == owner.user_id)
        .expect("listing stored")
        .id
}

/// Post an inquiry from `asker` on `property_id` and return its id.
pub fn seed_inquiry(
    market: &TestMarket,
    store: &MemoryStore,
    asker: &Identity,
    property_id: &Uuid,
) -> Uuid {
    market
        .create_inquiry(Some(asker), property_id, &form(&[("content", "Is parking included?")]))
        .expect("asker can inquire");
    store
        .list_inquiries(property_id)
        .unwrap()
        .into_iter()
        .find(|(i, _)| i.user_id == asker.user_id)
        .expect("inquiry stored")
        .0
        .id
}
