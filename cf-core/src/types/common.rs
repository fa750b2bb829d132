//! Common types used across the funding ledger
//!
//! Monetary values are integers in the smallest currency unit and travel
//! as decimal strings, so they survive JSON clients that cannot hold
//! 128-bit numbers.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

/// Amount in the smallest currency unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Parse a string-encoded integer amount.
    ///
    /// Leading/trailing whitespace is ignored. Signs, decimal points and
    /// exponents are rejected.
    pub fn parse(raw: &str, field: &str) -> LedgerResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Validation(format!("{} is required", field)));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::Validation(format!(
                "{} must be a non-negative integer in the smallest currency unit, got '{}'",
                field, trimmed
            )));
        }
        trimmed
            .parse::<u128>()
            .map(Self)
            .map_err(|_| LedgerError::Validation(format!("{} is out of range: '{}'", field, trimmed)))
    }

    /// Parse an amount that must be strictly positive
    pub fn parse_positive(raw: &str, field: &str) -> LedgerResult<Self> {
        let amount = Self::parse(raw, field)?;
        if amount.is_zero() {
            return Err(LedgerError::Validation(format!("{} must be greater than zero", field)));
        }
        Ok(amount)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u128>().map(Amount).map_err(de::Error::custom)
    }
}

/// Wallet address, case-normalized
///
/// Users are keyed by wallet address. Every address entering the system is
/// trimmed and lowercased before it is compared or stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Normalize and validate a raw wallet address
    pub fn parse(raw: &str, field: &str) -> LedgerResult<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LedgerError::Validation(format!("{} is required", field)));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(LedgerError::Validation(format!(
                "{} must not contain whitespace",
                field
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Campaign ID
    CampaignId
);
string_id!(
    /// Contribution ID
    ContributionId
);
string_id!(
    /// Milestone ID
    MilestoneId
);
string_id!(
    /// Campaign update (news post) ID
    UpdateId
);

/// External event identifier
///
/// Caller-supplied token (for example an on-chain transaction hash) that
/// identifies one funding event. At most one contribution exists per
/// event id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    pub fn parse(raw: &str, field: &str) -> LedgerResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Validation(format!("{} is required", field)));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
