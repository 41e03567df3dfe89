use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{AccountStore, DeviceStore, KeyValueStore, Posting, StoreError, WriteBatch};
use crate::models::{Notification, Transaction};
use crate::types::Amount;

fn posting(user_id: Uuid, balance: &str, amount: &str) -> Result<Posting> {
    let transaction = Transaction::withdrawal(Amount::from_str(amount)?, None);
    let notification = Notification::withdrawal(user_id, &transaction);

    Ok(Posting {
        user_id,
        balance: Decimal::from_str(balance)?,
        transaction,
        notification,
    })
}

#[test]
fn test_store_basic_get_and_commit_operations() -> Result<()> {
    let store = DeviceStore::in_memory();

    assert!(store.get("missing")?.is_none());

    let mut batch = WriteBatch::new();
    batch.put("balance:u1", "\"10.00\"");
    store.commit(batch)?;

    assert_eq!(store.get("balance:u1")?.as_deref(), Some("\"10.00\""));
    assert_eq!(store.keys(), vec!["balance:u1".to_string()]);

    Ok(())
}

#[test]
fn test_batch_commit_applies_every_entry_in_order() -> Result<()> {
    let store = DeviceStore::in_memory();

    let mut batch = WriteBatch::new();
    batch.put("a", "1");
    batch.put("b", "2");
    batch.put("a", "3");
    store.commit(batch)?;

    assert_eq!(store.get("a")?.as_deref(), Some("3"));
    assert_eq!(store.get("b")?.as_deref(), Some("2"));

    Ok(())
}

#[test]
fn test_record_lands_balance_history_and_feed_together() -> Result<()> {
    let store = AccountStore::new(Arc::new(DeviceStore::in_memory()));
    let user = Uuid::new_v4();

    store.record(vec![posting(user, "750.00", "250.00")?])?;

    assert_eq!(store.balance(&user)?, Some(Decimal::from_str("750.00")?));
    assert_eq!(store.transactions(&user)?.len(), 1);
    assert_eq!(store.notifications(&user)?.len(), 1);

    Ok(())
}

#[test]
fn test_record_rejects_duplicate_references_without_partial_writes() -> Result<()> {
    let store = AccountStore::new(Arc::new(DeviceStore::in_memory()));
    let user = Uuid::new_v4();

    let first = posting(user, "900.00", "100.00")?;
    let reference = first.transaction.reference.clone();
    store.record(vec![first])?;

    let mut second = posting(user, "800.00", "100.00")?;
    second.transaction.reference = reference;

    let result = store.record(vec![second]);

    assert!(matches!(result, Err(StoreError::DuplicateReference { .. })));
    assert_eq!(store.balance(&user)?, Some(Decimal::from_str("900.00")?));
    assert_eq!(store.transactions(&user)?.len(), 1);
    assert_eq!(store.notifications(&user)?.len(), 1);

    Ok(())
}

#[test]
fn test_absent_entries_read_as_empty_defaults() -> Result<()> {
    let store = AccountStore::new(Arc::new(DeviceStore::in_memory()));
    let user = Uuid::new_v4();

    assert!(store.balance(&user)?.is_none());
    assert!(store.transactions(&user)?.is_empty());
    assert!(store.notifications(&user)?.is_empty());
    assert!(store.cards(&user)?.is_empty());

    Ok(())
}

#[test]
fn test_file_backed_store_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("store.json");
    let user = Uuid::new_v4();

    {
        let store = AccountStore::new(Arc::new(DeviceStore::open(&path)?));
        store.record(vec![posting(user, "750.00", "250.00")?])?;
    }

    let store = AccountStore::new(Arc::new(DeviceStore::open(&path)?));

    assert_eq!(store.balance(&user)?, Some(Decimal::from_str("750.00")?));
    assert_eq!(store.transactions(&user)?.len(), 1);
    assert_eq!(store.notifications(&user)?.len(), 1);

    Ok(())
}

#[test]
fn test_users_enumerates_accounts_with_balances() -> Result<()> {
    let store = AccountStore::new(Arc::new(DeviceStore::in_memory()));
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    store.record(vec![posting(first, "750.00", "250.00")?])?;
    store.record(vec![posting(second, "500.00", "500.00")?])?;

    let mut users = store.users();
    users.sort();

    let mut expected = vec![first, second];
    expected.sort();

    assert_eq!(users, expected);

    Ok(())
}
