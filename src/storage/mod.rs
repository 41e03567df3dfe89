mod account_store;
mod device_store;
pub(crate) mod keys;
#[cfg(test)]
mod tests;

use thiserror::Error;

pub use account_store::{opening_balance, AccountStore, Posting};
pub use device_store::DeviceStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate transaction reference [{reference}]")]
    DuplicateReference { reference: String },
    #[error("Stored value could not be encoded or decoded: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// An ordered set of whole-value writes applied as a single unit.
#[derive(Debug, Default)]
pub struct WriteBatch {
    entries: Vec<(String, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Device-local key-value storage: string keys, JSON-serialized whole values,
/// read-modify-write only.
///
/// A committed batch is applied in order with no other commit interleaved, so
/// multi-key sequences (balance plus history plus feed) land together.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
    fn keys(&self) -> Vec<String>;
}
