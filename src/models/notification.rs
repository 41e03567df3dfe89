use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{NotificationType, Transaction};
use crate::types::{Amount, UserId};

/// A user-facing record describing a completed account event.
///
/// Amount, reference, and card digits are denormalized copies of the
/// triggering transaction so the feed renders without a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    /// Whether the user has opened this notification. The only field mutated
    /// after creation.
    #[serde(default)]
    pub is_read: bool,
    /// Creation instant, used for most-recent-first feed ordering.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn deposit(user_id: UserId, transaction: &Transaction) -> Self {
        Self::from_transaction(
            user_id,
            NotificationType::Deposit,
            "Deposit Successful",
            format!("Your deposit of {} is complete.", transaction.amount),
            transaction,
        )
    }

    pub fn withdrawal(user_id: UserId, transaction: &Transaction) -> Self {
        Self::from_transaction(
            user_id,
            NotificationType::Withdraw,
            "Withdrawal Successful",
            format!("You withdrew {} from your account.", transaction.amount),
            transaction,
        )
    }

    pub fn transfer_sent(user_id: UserId, transaction: &Transaction) -> Self {
        Self::from_transaction(
            user_id,
            NotificationType::TransferSent,
            "Transfer Sent",
            format!("You sent {} to another account.", transaction.amount),
            transaction,
        )
    }

    pub fn transfer_received(user_id: UserId, transaction: &Transaction) -> Self {
        Self::from_transaction(
            user_id,
            NotificationType::TransferReceived,
            "Transfer Received",
            format!("You received {}.", transaction.amount),
            transaction,
        )
    }

    /// Marks the notification as opened.
    pub fn mark_read(&mut self) {
        self.is_read = true;
    }

    fn from_transaction(
        user_id: UserId,
        notification_type: NotificationType,
        title: &str,
        message: String,
        transaction: &Transaction,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            notification_type,
            title: title.to_string(),
            message,
            amount: Some(transaction.amount),
            reference: Some(transaction.reference.clone()),
            card_last4: transaction.card_last4.clone(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
