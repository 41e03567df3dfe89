use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::StoreError;
use crate::types::{Amount, AmountError, CardId, UserId};

/// Everything a balance mutation can fail with: input validation, business
/// rules, and the storage layer underneath.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("Insufficient balance for client [{user_id}]: requested {requested}, available {available}")]
    InsufficientFunds {
        user_id: UserId,
        requested: Amount,
        available: Decimal,
    },
    #[error("Balance overflow for client [{user_id}]")]
    Overflow {
        user_id: UserId,
    },
    #[error("Client [{user_id}] cannot transfer to themselves")]
    SelfTransfer {
        user_id: UserId,
    },
    #[error("Transfer for client [{user_id}] is missing a counterparty")]
    MissingCounterparty {
        user_id: UserId,
    },
    #[error("Card [{card_id}] was not found for client [{user_id}]")]
    CardNotFound {
        user_id: UserId,
        card_id: CardId,
    },
    #[error("Card [{card_id}] is frozen for client [{user_id}]")]
    CardFrozen {
        user_id: UserId,
        card_id: CardId,
    },
    #[error("Invalid card: {reason}")]
    InvalidCard {
        reason: String,
    },
    #[error("Notification [{notification_id}] was not found for client [{user_id}]")]
    NotificationNotFound {
        user_id: UserId,
        notification_id: Uuid,
    },
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AccountError {
    pub fn insufficient_funds(user_id: UserId, requested: Amount, available: Decimal) -> Self {
        Self::InsufficientFunds {
            user_id,
            requested,
            available,
        }
    }

    pub fn overflow(user_id: UserId) -> Self {
        Self::Overflow { user_id }
    }

    pub fn self_transfer(user_id: UserId) -> Self {
        Self::SelfTransfer { user_id }
    }

    pub fn missing_counterparty(user_id: UserId) -> Self {
        Self::MissingCounterparty { user_id }
    }

    pub fn card_not_found(user_id: UserId, card_id: CardId) -> Self {
        Self::CardNotFound { user_id, card_id }
    }

    pub fn card_frozen(user_id: UserId, card_id: CardId) -> Self {
        Self::CardFrozen { user_id, card_id }
    }

    pub fn invalid_card(reason: impl Into<String>) -> Self {
        Self::InvalidCard {
            reason: reason.into(),
        }
    }

    pub fn notification_not_found(user_id: UserId, notification_id: Uuid) -> Self {
        Self::NotificationNotFound {
            user_id,
            notification_id,
        }
    }
}
