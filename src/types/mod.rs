mod errors;
mod monetary;

use uuid::Uuid;

pub use errors::AmountError;
pub use monetary::Amount;

pub type UserId = Uuid;
pub type CardId = Uuid;
