use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::CardId;

/// A locally cached payment card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Last four digits of the card number, the only part kept on device.
    pub last4: String,
    /// User-chosen display name.
    pub label: String,
    /// Frozen cards cannot fund deposits.
    #[serde(default)]
    pub frozen: bool,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn new(last4: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            last4: last4.into(),
            label: label.into(),
            frozen: false,
            created_at: Utc::now(),
        }
    }
}
