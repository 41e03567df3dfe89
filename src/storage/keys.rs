//! Key scheme for the device store: one entry per user per record family.

use crate::types::UserId;

pub(crate) const BALANCE_PREFIX: &str = "balance:";

pub(crate) fn balance(user_id: &UserId) -> String {
    format!("{BALANCE_PREFIX}{user_id}")
}

pub(crate) fn transactions(user_id: &UserId) -> String {
    format!("transactions:{user_id}")
}

pub(crate) fn notifications(user_id: &UserId) -> String {
    format!("notifications:{user_id}")
}

pub(crate) fn cards(user_id: &UserId) -> String {
    format!("cards:{user_id}")
}
