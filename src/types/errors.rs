use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("Amount error: {0}")]
    InvalidFormat(String),
    #[error("Amount error: value must be greater than zero")]
    NotPositive,
    #[error("Amount error: value has more than two decimal places")]
    TooPrecise,
}
