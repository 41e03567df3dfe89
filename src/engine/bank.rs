use std::fs::File;
use std::io::BufReader;
use std::str::FromStr;
use std::sync::Arc;

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::models::{AccountError, Card, Notification, Transaction};
use crate::storage::{opening_balance, AccountStore, KeyValueStore, Posting};
use crate::types::{Amount, CardId, UserId};

/// Outcome of a successful balance mutation, surfaced for display.
#[derive(Debug)]
pub struct Receipt {
    pub transaction: Transaction,
    pub balance: Decimal,
}

/// One row of a replay file.
#[derive(Debug, Deserialize)]
struct OpRow {
    #[serde(rename = "type")]
    op: OpKind,
    user: UserId,
    to: Option<UserId>,
    amount: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OpKind {
    Deposit,
    Withdraw,
    Transfer,
}

/// Banking engine: validates and applies balance mutations against the
/// device store.
///
/// Every mutation validates its input before touching storage, then runs its
/// read-check-write sequence behind a single write guard. Concurrent
/// mutations serialize instead of interleaving, so a balance can never be
/// spent twice, and each sequence lands as one atomic commit.
pub struct BankEngine<S> {
    store: AccountStore<S>,
    write_guard: Mutex<()>,
    backpressure: usize,
}

impl<S: KeyValueStore> BankEngine<S> {
    pub fn new(kv: Arc<S>) -> Self {
        Self {
            store: AccountStore::new(kv),
            write_guard: Mutex::new(()),
            backpressure: 256,
        }
    }

    /// The typed store behind this engine.
    pub fn store(&self) -> &AccountStore<S> {
        &self.store
    }

    /// The spendable balance, assuming the opening balance for an account
    /// whose entry has never been written.
    pub fn balance(&self, user_id: UserId) -> Result<Decimal, AccountError> {
        Ok(self.store.balance(&user_id)?.unwrap_or_else(opening_balance))
    }

    /// The account's transaction history, most recent first.
    pub fn history(&self, user_id: UserId) -> Result<Vec<Transaction>, AccountError> {
        let mut transactions = self.store.transactions(&user_id)?;
        transactions.reverse();

        Ok(transactions)
    }

    /// The account's notification feed, most recent first.
    pub fn notifications(&self, user_id: UserId) -> Result<Vec<Notification>, AccountError> {
        let mut notifications = self.store.notifications(&user_id)?;
        notifications.reverse();

        Ok(notifications)
    }

    /// The account's locally cached cards.
    pub fn cards(&self, user_id: UserId) -> Result<Vec<Card>, AccountError> {
        Ok(self.store.cards(&user_id)?)
    }

    /// Credits the account, optionally funding from a stored card.
    pub async fn deposit(
        &self,
        user_id: UserId,
        amount: &str,
        card_id: Option<CardId>,
        description: Option<&str>,
    ) -> Result<Receipt, AccountError> {
        let amount = Amount::from_str(amount)?;

        let _guard = self.write_guard.lock().await;

        let card = match card_id {
            Some(card_id) => Some(self.require_active_card(user_id, card_id)?),
            None => None,
        };

        let available = self.balance(user_id)?;
        let balance = available
            .checked_add(amount.value())
            .ok_or_else(|| AccountError::overflow(user_id))?;

        let transaction = Transaction::deposit(amount, card.as_ref(), description.map(Into::into));
        let notification = Notification::deposit(user_id, &transaction);
        let receipt = Receipt {
            transaction: transaction.clone(),
            balance,
        };

        self.store.record(vec![Posting {
            user_id,
            balance,
            transaction,
            notification,
        }])?;

        debug!(
            "Deposit [{}] for client [{user_id}] applied",
            receipt.transaction.reference
        );

        Ok(receipt)
    }

    /// Debits the account after checking the balance covers the amount.
    pub async fn withdraw(
        &self,
        user_id: UserId,
        amount: &str,
        description: Option<&str>,
    ) -> Result<Receipt, AccountError> {
        let amount = Amount::from_str(amount)?;

        let _guard = self.write_guard.lock().await;

        let available = self.balance(user_id)?;

        if available < amount.value() {
            return Err(AccountError::insufficient_funds(user_id, amount, available));
        }

        let balance = available - amount.value();
        let transaction = Transaction::withdrawal(amount, description.map(Into::into));
        let notification = Notification::withdrawal(user_id, &transaction);
        let receipt = Receipt {
            transaction: transaction.clone(),
            balance,
        };

        self.store.record(vec![Posting {
            user_id,
            balance,
            transaction,
            notification,
        }])?;

        debug!(
            "Withdrawal [{}] for client [{user_id}] applied",
            receipt.transaction.reference
        );

        Ok(receipt)
    }

    /// Moves funds between two accounts as one atomic commit.
    ///
    /// The same transaction record, under one reference, lands in both
    /// histories, together with a sent notification for the sender and a
    /// received notification for the receiver.
    pub async fn transfer(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        amount: &str,
        description: Option<&str>,
    ) -> Result<Receipt, AccountError> {
        let amount = Amount::from_str(amount)?;

        if sender_id == receiver_id {
            return Err(AccountError::self_transfer(sender_id));
        }

        let _guard = self.write_guard.lock().await;

        let sender_available = self.balance(sender_id)?;

        if sender_available < amount.value() {
            return Err(AccountError::insufficient_funds(
                sender_id,
                amount,
                sender_available,
            ));
        }

        let sender_balance = sender_available - amount.value();
        let receiver_balance = self
            .balance(receiver_id)?
            .checked_add(amount.value())
            .ok_or_else(|| AccountError::overflow(receiver_id))?;

        let transaction =
            Transaction::transfer(sender_id, receiver_id, amount, description.map(Into::into));
        let receipt = Receipt {
            transaction: transaction.clone(),
            balance: sender_balance,
        };

        self.store.record(vec![
            Posting {
                user_id: sender_id,
                balance: sender_balance,
                notification: Notification::transfer_sent(sender_id, &transaction),
                transaction: transaction.clone(),
            },
            Posting {
                user_id: receiver_id,
                balance: receiver_balance,
                notification: Notification::transfer_received(receiver_id, &transaction),
                transaction,
            },
        ])?;

        debug!(
            "Transfer [{}] from [{sender_id}] to [{receiver_id}] applied",
            receipt.transaction.reference
        );

        Ok(receipt)
    }

    /// Flips a notification to read and rewrites the feed value.
    pub async fn mark_notification_read(
        &self,
        user_id: UserId,
        notification_id: Uuid,
    ) -> Result<Notification, AccountError> {
        let _guard = self.write_guard.lock().await;

        let mut notifications = self.store.notifications(&user_id)?;
        let notification = notifications
            .iter_mut()
            .find(|notification| notification.id == notification_id)
            .ok_or_else(|| AccountError::notification_not_found(user_id, notification_id))?;

        notification.mark_read();
        let updated = notification.clone();

        self.store.put_notifications(&user_id, &notifications)?;

        Ok(updated)
    }

    /// Caches a new card locally. The last four digits are all the device
    /// keeps of the number.
    pub async fn add_card(
        &self,
        user_id: UserId,
        last4: &str,
        label: &str,
    ) -> Result<Card, AccountError> {
        if last4.len() != 4 || !last4.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(AccountError::invalid_card("expected exactly four digits"));
        }

        let _guard = self.write_guard.lock().await;

        let mut cards = self.store.cards(&user_id)?;
        let card = Card::new(last4, label);
        cards.push(card.clone());

        self.store.put_cards(&user_id, &cards)?;

        Ok(card)
    }

    /// Freezes or unfreezes a cached card.
    pub async fn set_card_frozen(
        &self,
        user_id: UserId,
        card_id: CardId,
        frozen: bool,
    ) -> Result<Card, AccountError> {
        let _guard = self.write_guard.lock().await;

        let mut cards = self.store.cards(&user_id)?;
        let card = cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| AccountError::card_not_found(user_id, card_id))?;

        card.frozen = frozen;
        let updated = card.clone();

        self.store.put_cards(&user_id, &cards)?;

        Ok(updated)
    }

    /// Drops a card from the local cache.
    pub async fn remove_card(&self, user_id: UserId, card_id: CardId) -> Result<(), AccountError> {
        let _guard = self.write_guard.lock().await;

        let mut cards = self.store.cards(&user_id)?;
        let before = cards.len();
        cards.retain(|card| card.id != card_id);

        if cards.len() == before {
            return Err(AccountError::card_not_found(user_id, card_id));
        }

        self.store.put_cards(&user_id, &cards)?;

        Ok(())
    }

    /// Replays a CSV of operations against the store.
    ///
    /// Rows are read off the async runtime and applied strictly in file
    /// order. Malformed rows and rejected operations are logged and skipped;
    /// a missing file is logged without failing the run.
    pub async fn replay(&self, path: &str) -> anyhow::Result<()> {
        let (sender, mut receiver) = mpsc::channel::<OpRow>(self.backpressure);
        let reader_handle = spawn_csv_reader(path.to_string(), sender);

        while let Some(row) = receiver.recv().await {
            if let Err(err) = self.apply_row(&row).await {
                warn!("Skipped {:?} for client [{}]: {err}", row.op, row.user);
            }
        }

        if let Err(err) = reader_handle.await {
            error!("Replay ingestion failed: {err}");
        }

        Ok(())
    }

    async fn apply_row(&self, row: &OpRow) -> Result<(), AccountError> {
        let amount = row.amount.as_deref().unwrap_or_default();
        let description = row.description.as_deref();

        match row.op {
            OpKind::Deposit => self.deposit(row.user, amount, None, description).await?,
            OpKind::Withdraw => self.withdraw(row.user, amount, description).await?,
            OpKind::Transfer => {
                let receiver_id = row
                    .to
                    .ok_or_else(|| AccountError::missing_counterparty(row.user))?;

                self.transfer(row.user, receiver_id, amount, description).await?
            }
        };

        Ok(())
    }

    fn require_active_card(&self, user_id: UserId, card_id: CardId) -> Result<Card, AccountError> {
        let card = self
            .store
            .cards(&user_id)?
            .into_iter()
            .find(|card| card.id == card_id)
            .ok_or_else(|| AccountError::card_not_found(user_id, card_id))?;

        if card.frozen {
            return Err(AccountError::card_frozen(user_id, card_id));
        }

        Ok(card)
    }
}

fn spawn_csv_reader(path: String, sender: mpsc::Sender<OpRow>) -> JoinHandle<()> {
    spawn_blocking(move || {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                error!("Error opening replay file at path: {path} | {err}");
                return;
            }
        };

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));

        for result in reader.deserialize::<OpRow>() {
            match result {
                Ok(row) => {
                    if sender.blocking_send(row).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!("Replay row could not be parsed: {err}");
                }
            }
        }
    })
}
