use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::types::errors::AmountError;

const DECIMAL_PLACES: u32 = 2;

/// A strictly positive monetary value, normalized to two decimal places.
///
/// Every amount entering the engine passes through this type: the parsing and
/// deserialization paths reject anything that is not a decimal greater than
/// zero with at most two decimal places, so downstream code never re-checks.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Validates a raw decimal and normalizes it to cent precision.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }

        let mut value = value.normalize();

        if value.scale() > DECIMAL_PLACES {
            return Err(AmountError::TooPrecise);
        }

        value.rescale(DECIMAL_PLACES);

        Ok(Amount(value))
    }

    /// The underlying decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(AmountError::InvalidFormat("value is an empty string".to_string()));
        }

        let parsed = Decimal::from_str(value)
            .map_err(|error| AmountError::InvalidFormat(error.to_string()))?;

        Amount::new(parsed)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Amount::new(value).map_err(de::Error::custom)
    }
}
