//! Listing and inquiry policy for the Dwell marketplace.
//!
//! Everything that decides *whether* a write may happen lives here: form
//! validation, identity and ownership checks, the listing status lifecycle,
//! and the image ingestion gate. Storage and view invalidation are reached
//! through the [`MarketStore`] and [`ViewInvalidator`] traits.

pub mod error;
pub mod identity;
pub mod ingest;
pub mod password;
pub mod service;
pub mod stale;
pub mod store;
pub mod validation;

pub use error::{FormRejection, MarketError};
pub use identity::Identity;
pub use ingest::{ImageGate, IngestedImage};
pub use service::{Marketplace, Outcome};
pub use stale::ViewInvalidator;
pub use store::{MarketStore, StoreError};
pub use validation::RawForm;
