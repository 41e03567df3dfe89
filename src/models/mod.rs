mod card;
mod errors;
mod notification;
mod transaction;

use serde::{Deserialize, Serialize};

pub use card::Card;
pub use errors::AccountError;
pub use notification::Notification;
pub use transaction::Transaction;

/// The operation a transaction records. Fixed enumeration, never extended at
/// runtime.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
}

/// Settlement state of a transaction.
///
/// Records are created already terminal; `Pending` exists only as a stored
/// value, and no transition path is provided.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Deposit,
    Withdraw,
    TransferSent,
    TransferReceived,
}
