use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Card, TransactionStatus, TransactionType};
use crate::types::{Amount, CardId, UserId};

/// A single account event, stored append-only in the owner's history list.
///
/// Deposits and withdrawals carry no counterparty. A transfer is mirrored
/// into both parties' lists under the same reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for this transaction, used for lookup and
    /// idempotency. No two transactions in a history may share one.
    pub reference: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Settlement state. Always created terminal.
    #[serde(default)]
    pub status: TransactionStatus,
    /// Funds moved, strictly positive.
    pub amount: Amount,
    /// Sending party (transfers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    /// Receiving party (transfers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<UserId>,
    /// Card that funded the operation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<CardId>,
    /// Display copy of that card's last four digits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn deposit(amount: Amount, card: Option<&Card>, description: Option<String>) -> Self {
        Self {
            card_id: card.map(|card| card.id),
            card_last4: card.map(|card| card.last4.clone()),
            ..Self::base(TransactionType::Deposit, amount, description)
        }
    }

    pub fn withdrawal(amount: Amount, description: Option<String>) -> Self {
        Self::base(TransactionType::Withdraw, amount, description)
    }

    pub fn transfer(
        sender_id: UserId,
        receiver_id: UserId,
        amount: Amount,
        description: Option<String>,
    ) -> Self {
        Self {
            sender_id: Some(sender_id),
            receiver_id: Some(receiver_id),
            ..Self::base(TransactionType::Transfer, amount, description)
        }
    }

    fn base(transaction_type: TransactionType, amount: Amount, description: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            reference: new_reference(),
            transaction_type,
            status: TransactionStatus::Completed,
            amount,
            sender_id: None,
            receiver_id: None,
            card_id: None,
            card_last4: None,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

fn new_reference() -> String {
    format!("TXN-{}", Uuid::new_v4().simple())
}
