use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::{error, info};
use uuid::Uuid;

use dwell_types::api::{InquiryView, PropertyDetailResponse};
use dwell_types::events::StaleView;
use dwell_types::models::{Inquiry, Property, PropertyStatus, User};

use crate::error::{FormRejection, MarketError};
use crate::identity::Identity;
use crate::password::{hash_password, verify_password};
use crate::stale::ViewInvalidator;
use crate::store::{MarketStore, NewUser, StoreError};
use crate::validation::{
    RawForm, validate_answer, validate_inquiry, validate_login, validate_property,
    validate_sign_up,
};

/// Region keys the listing filter understands. Anything else, including the
/// "all" key, means no filter.
pub const REGIONS: [&str; 17] = [
    "서울", "경기", "인천", "부산", "대구", "광주", "대전", "울산", "세종", "강원", "충북",
    "충남", "전북", "전남", "경북", "경남", "제주",
];

/// Where the caller goes after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The workflow is finished; move to this view.
    Redirect(String),
    /// Stay on the current view and render an inline status.
    Inline,
}

impl Outcome {
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Redirect(path) => Some(path),
            Self::Inline => None,
        }
    }
}

/// Marketplace policy: identity, ownership and lifecycle rules in front of
/// the store. Every write path checks auth, existence and ownership before
/// issuing the write, and marks affected views stale afterwards.
pub struct Marketplace<S, V> {
    store: Arc<S>,
    views: Arc<V>,
}

impl<S, V> Clone for Marketplace<S, V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            views: self.views.clone(),
        }
    }
}

fn require(actor: Option<&Identity>) -> Result<&Identity, MarketError> {
    actor.ok_or(MarketError::Unauthenticated)
}

/// Log the store cause for operators and hand back a generic message.
fn store_failure(operation: &'static str, message: &'static str) -> impl FnOnce(StoreError) -> MarketError {
    move |e| {
        error!("{} failed: {}", operation, e);
        MarketError::persistence(message)
    }
}

impl<S, V> Marketplace<S, V>
where
    S: MarketStore + 'static,
    V: ViewInvalidator + 'static,
{
    pub fn new(store: Arc<S>, views: Arc<V>) -> Self {
        Self { store, views }
    }

    // -- Accounts --

    pub fn sign_up(&self, form: &RawForm) -> Result<User, MarketError> {
        let fields = validate_sign_up(form)?;

        let echo: BTreeMap<String, String> = [
            ("name", fields.name.clone()),
            ("email", fields.email.clone()),
            ("phoneNumber", fields.phone_number.clone().unwrap_or_default()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let failed = || {
            MarketError::Persistence(
                FormRejection::new("Something went wrong while signing up.").with_echo(echo.clone()),
            )
        };
        let taken = || {
            MarketError::Conflict(
                FormRejection::new("An account with this email already exists.")
                    .with_echo(echo.clone()),
            )
        };

        let existing = self.store.find_user_by_email(&fields.email).map_err(|e| {
            error!("sign-up lookup failed: {}", e);
            failed()
        })?;
        if existing.is_some() {
            return Err(taken());
        }

        let password_hash = hash_password(&fields.password).map_err(|e| {
            error!("password hashing failed: {}", e);
            failed()
        })?;

        let new_user = NewUser {
            id: Uuid::new_v4(),
            name: fields.name,
            email: fields.email,
            password_hash,
            phone_number: fields.phone_number,
            // Stores keep microseconds; the returned user matches the stored row
            created_at: Utc::now().trunc_subsecs(6),
        };

        match self.store.create_user(&new_user) {
            Ok(()) => {}
            // Lost a race with a concurrent sign-up for the same email
            Err(StoreError::Conflict) => return Err(taken()),
            Err(e) => {
                error!("sign-up insert failed: {}", e);
                return Err(failed());
            }
        }

        info!("User {} signed up", new_user.id);
        Ok(User {
            id: new_user.id,
            name: new_user.name,
            email: new_user.email,
            phone_number: new_user.phone_number,
            created_at: new_user.created_at,
        })
    }

    /// Check credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub fn authenticate(&self, form: &RawForm) -> Result<User, MarketError> {
        let fields = validate_login(form)?;

        let record = self
            .store
            .find_user_by_email(&fields.email)
            .map_err(store_failure("login lookup", "An unknown error occurred."))?
            .ok_or(MarketError::InvalidCredentials)?;

        if !verify_password(&fields.password, &record.password_hash) {
            return Err(MarketError::InvalidCredentials);
        }
        Ok(record.user)
    }

    // -- Listings --

    pub fn create_property(
        &self,
        actor: Option<&Identity>,
        form: &RawForm,
    ) -> Result<Outcome, MarketError> {
        let actor = require(actor)?;
        let fields = validate_property(form)?;

        let property = Property {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            price: fields.price,
            address: fields.address,
            detail_address: fields.detail_address,
            region: fields.region,
            image_url: fields.image_url,
            // New listings always start available
            status: PropertyStatus::Available,
            owner_id: actor.user_id,
            created_at: Utc::now(),
        };

        self.store.create_property(&property).map_err(store_failure(
            "property create",
            "Something went wrong while registering the listing.",
        ))?;

        info!("Property {} created by {}", property.id, actor.user_id);
        self.views.mark_stale(StaleView::Listings);
        self.views.mark_stale(StaleView::Property {
            property_id: property.id,
        });
        Ok(Outcome::Redirect("/".to_string()))
    }

    pub fn update_property(
        &self,
        actor: Option<&Identity>,
        property_id: &Uuid,
        form: &RawForm,
    ) -> Result<Outcome, MarketError> {
        let actor = require(actor)?;
        let failed = || {
            store_failure(
                "property update",
                "Something went wrong while updating the listing.",
            )
        };

        let mut property = self
            .store
            .find_property(property_id)
            .map_err(failed())?
            .ok_or(MarketError::NotFound("Listing not found."))?;

        if !actor.owns(&property.owner_id) {
            return Err(MarketError::Forbidden(
                "You do not have permission to edit this listing.",
            ));
        }

        let fields = validate_property(form)?;
        property.title = fields.title;
        property.description = fields.description;
        property.price = fields.price;
        property.address = fields.address;
        property.detail_address = fields.detail_address;
        property.region = fields.region;
        property.image_url = fields.image_url;
        if let Some(status) = fields.status {
            property.status = status;
        }

        self.store.update_property(&property).map_err(|e| match e {
            StoreError::NotFound => MarketError::NotFound("Listing not found."),
            other => failed()(other),
        })?;

        info!(
            "Property {} updated by owner (status {})",
            property.id, property.status
        );
        self.views.mark_stale(StaleView::Listings);
        self.views.mark_stale(StaleView::Property {
            property_id: property.id,
        });
        Ok(Outcome::Redirect(format!("/properties/{}", property.id)))
    }

    pub fn list_properties(&self, region: Option<&str>) -> Result<Vec<Property>, MarketError> {
        let filter = region.filter(|r| REGIONS.contains(r));
        self.store
            .list_properties(filter)
            .map_err(store_failure("property list", "Could not load listings."))
    }

    /// Public detail view; `viewer` only decides `is_owner`.
    pub fn property_detail(
        &self,
        viewer: Option<&Identity>,
        property_id: &Uuid,
    ) -> Result<PropertyDetailResponse, MarketError> {
        let failed = || store_failure("property detail", "Could not load the listing.");

        let property = self
            .store
            .find_property(property_id)
            .map_err(failed())?
            .ok_or(MarketError::NotFound("Listing not found."))?;

        let owner = self
            .store
            .find_user(&property.owner_id)
            .map_err(failed())?;
        let (owner_name, owner_email, owner_phone_number) = match owner {
            Some(user) => (user.name, Some(user.email), user.phone_number),
            None => ("unknown".to_string(), None, None),
        };

        let inquiries = self
            .store
            .list_inquiries(property_id)
            .map_err(failed())?
            .into_iter()
            .map(|(inquiry, asker_name)| InquiryView {
                inquiry,
                asker_name,
            })
            .collect();

        let is_owner = viewer.is_some_and(|v| v.owns(&property.owner_id));
        Ok(PropertyDetailResponse {
            property,
            owner_name,
            owner_email,
            owner_phone_number,
            is_owner,
            inquiries,
        })
    }

    /// Load a listing to pre-fill its edit form. Owner only.
    pub fn property_for_edit(
        &self,
        actor: Option<&Identity>,
        property_id: &Uuid,
    ) -> Result<Property, MarketError> {
        let actor = require(actor)?;
        let property = self
            .store
            .find_property(property_id)
            .map_err(store_failure("property edit load", "Could not load the listing."))?
            .ok_or(MarketError::NotFound("Listing not found."))?;

        if !actor.owns(&property.owner_id) {
            return Err(MarketError::Forbidden(
                "You do not have permission to edit this listing.",
            ));
        }
        Ok(property)
    }

    // -- Inquiries --

    /// Any signed-in user may ask, the listing owner included.
    pub fn create_inquiry(
        &self,
        actor: Option<&Identity>,
        property_id: &Uuid,
        form: &RawForm,
    ) -> Result<Outcome, MarketError> {
        let actor = require(actor)?;
        let failed = || {
            store_failure(
                "inquiry create",
                "Something went wrong while posting the inquiry.",
            )
        };

        if self.store.find_property(property_id).map_err(failed())?.is_none() {
            return Err(MarketError::NotFound("Listing not found."));
        }

        let fields = validate_inquiry(form)?;
        let inquiry = Inquiry {
            id: Uuid::new_v4(),
            content: fields.content,
            answer: None,
            property_id: *property_id,
            user_id: actor.user_id,
            created_at: Utc::now(),
        };

        self.store.create_inquiry(&inquiry).map_err(failed())?;

        info!("Inquiry {} posted on property {}", inquiry.id, property_id);
        self.views.mark_stale(StaleView::Property {
            property_id: *property_id,
        });
        Ok(Outcome::Inline)
    }

    /// Attach an answer. Only the listing owner may answer; answering again
    /// replaces the previous answer.
    pub fn create_answer(
        &self,
        actor: Option<&Identity>,
        inquiry_id: &Uuid,
        form: &RawForm,
    ) -> Result<Outcome, MarketError> {
        let actor = require(actor)?;
        let failed = || {
            store_failure(
                "answer create",
                "Something went wrong while posting the answer.",
            )
        };

        let (inquiry, property) = self
            .store
            .find_inquiry_with_property(inquiry_id)
            .map_err(failed())?
            .ok_or(MarketError::NotFound("Inquiry not found."))?;

        if !actor.owns(&property.owner_id) {
            return Err(MarketError::Forbidden(
                "You do not have permission to answer this inquiry.",
            ));
        }

        let fields = validate_answer(form)?;
        self.store
            .set_answer(&inquiry.id, &fields.answer)
            .map_err(|e| match e {
                StoreError::NotFound => MarketError::NotFound("Inquiry not found."),
                other => failed()(other),
            })?;

        info!(
            "Inquiry {} answered (replaced: {})",
            inquiry.id,
            inquiry.is_answered()
        );
        self.views.mark_stale(StaleView::Property {
            property_id: property.id,
        });
        Ok(Outcome::Inline)
    }
}
