//! pocketbank: the storage and transaction core of a consumer mobile banking
//! app.
//!
//! Account state lives on the device as JSON values in a key-value store: a
//! balance, a transaction history, a notification feed, and a list of cached
//! cards per user. [`engine::BankEngine`] applies balance mutations against
//! that store as atomic commits, and [`mailer::Mailer`] sends account email
//! through an SMTP relay configured from the environment.

pub mod engine;
pub mod mailer;
pub mod models;
pub mod storage;
pub mod types;

pub use engine::{BankEngine, Receipt};
pub use models::{AccountError, Card, Notification, Transaction};
pub use storage::{DeviceStore, KeyValueStore};
pub use types::Amount;
