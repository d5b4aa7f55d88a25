use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A read view that must be recomputed after a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StaleView {
    /// The listing collection (home page, region filters)
    Listings,

    /// A single listing's detail page, including its inquiries
    Property { property_id: Uuid },
}

impl StaleView {
    /// Path of the view this mark refers to.
    pub fn path(&self) -> String {
        match self {
            Self::Listings => "/".to_string(),
            Self::Property { property_id } => format!("/properties/{}", property_id),
        }
    }
}
