mod bank;

pub use bank::{BankEngine, Receipt};
