use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Card, Notification, Transaction};
use crate::storage::{keys, KeyValueStore, StoreError, WriteBatch};
use crate::types::UserId;

/// Balance assumed for an account whose balance entry has never been written.
pub fn opening_balance() -> Decimal {
    Decimal::new(1_000_00, 2)
}

/// One account's side of a balance mutation: the new balance plus the history
/// and feed records documenting it. Postings commit atomically, alone or
/// alongside a counterparty's posting.
#[derive(Debug)]
pub struct Posting {
    pub user_id: UserId,
    pub balance: Decimal,
    pub transaction: Transaction,
    pub notification: Notification,
}

/// Typed facade over the raw key-value entries backing the accounts.
pub struct AccountStore<S> {
    kv: Arc<S>,
}

impl<S: KeyValueStore> AccountStore<S> {
    pub fn new(kv: Arc<S>) -> Self {
        Self { kv }
    }

    /// The stored balance, or `None` for an account never written.
    pub fn balance(&self, user_id: &UserId) -> Result<Option<Decimal>, StoreError> {
        self.read(&keys::balance(user_id))
    }

    pub fn transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>, StoreError> {
        Ok(self.read(&keys::transactions(user_id))?.unwrap_or_default())
    }

    pub fn notifications(&self, user_id: &UserId) -> Result<Vec<Notification>, StoreError> {
        Ok(self.read(&keys::notifications(user_id))?.unwrap_or_default())
    }

    pub fn cards(&self, user_id: &UserId) -> Result<Vec<Card>, StoreError> {
        Ok(self.read(&keys::cards(user_id))?.unwrap_or_default())
    }

    /// Applies one or more postings as a single commit.
    ///
    /// Each posting appends its transaction and notification to the owner's
    /// lists and rewrites the owner's balance. A reference already present in
    /// the owner's history rejects the whole call before anything is written.
    pub fn record(&self, postings: Vec<Posting>) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();

        for posting in postings {
            let mut transactions = self.transactions(&posting.user_id)?;

            if transactions
                .iter()
                .any(|existing| existing.reference == posting.transaction.reference)
            {
                return Err(StoreError::DuplicateReference {
                    reference: posting.transaction.reference.clone(),
                });
            }

            transactions.push(posting.transaction);

            let mut notifications = self.notifications(&posting.user_id)?;
            notifications.push(posting.notification);

            batch.put(
                keys::balance(&posting.user_id),
                serde_json::to_string(&posting.balance)?,
            );
            batch.put(
                keys::transactions(&posting.user_id),
                serde_json::to_string(&transactions)?,
            );
            batch.put(
                keys::notifications(&posting.user_id),
                serde_json::to_string(&notifications)?,
            );
        }

        self.kv.commit(batch)
    }

    /// Rewrites a user's notification list as one whole value.
    pub fn put_notifications(
        &self,
        user_id: &UserId,
        notifications: &[Notification],
    ) -> Result<(), StoreError> {
        self.write(keys::notifications(user_id), notifications)
    }

    /// Rewrites a user's card list as one whole value.
    pub fn put_cards(&self, user_id: &UserId, cards: &[Card]) -> Result<(), StoreError> {
        self.write(keys::cards(user_id), cards)
    }

    /// Every user with a stored balance entry.
    pub fn users(&self) -> Vec<UserId> {
        self.kv
            .keys()
            .into_iter()
            .filter_map(|key| key.strip_prefix(keys::BALANCE_PREFIX)?.parse().ok())
            .collect()
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: String, value: &T) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.put(key, serde_json::to_string(value)?);

        self.kv.commit(batch)
    }
}
