//! Value Objects for the Scythe Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time, so code
//! further up never re-validates amounts, tickers or rates mid-harvest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Asset ticker must be uppercase ASCII alphanumeric
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// Basis points must be within [0, 10000]
    #[error("Invalid basis points: {0}")]
    InvalidBasisPoints(String),

    /// Fee tier must be a plausible pool fee
    #[error("Invalid fee tier: {0}")]
    InvalidFeeTier(String),

    /// Conversion route validation error
    #[error("Invalid conversion route: {0}")]
    InvalidRoute(String),

    /// Trigger state validation error
    #[error("Invalid trigger state: {0}")]
    InvalidTriggerState(String),

    /// Amount arithmetic overflowed
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Amount arithmetic underflowed
    #[error("Amount underflow: {0}")]
    AmountUnderflow(String),
}

// =============================================================================
// Amount
// =============================================================================

/// Amount represents a non-negative token quantity in base units
///
/// Base units are the smallest indivisible unit of the asset (wei-style),
/// so all arithmetic is integer arithmetic with explicit truncation.
///
/// # Invariants
/// - Always non-negative (unsigned representation)
/// - Additions are checked; subtraction is explicit about underflow
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from raw base units
    pub const fn new(base_units: u128) -> Self {
        Self(base_units)
    }

    /// Get the underlying base-unit value
    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    /// True when the amount is exactly zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    ///
    /// # Errors
    /// Returns `DomainError::AmountOverflow` when the sum exceeds `u128::MAX`
    pub fn checked_add(self, other: Amount) -> Result<Amount, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| DomainError::AmountOverflow(format!("{} + {}", self.0, other.0)))
    }

    /// Checked subtraction
    ///
    /// # Errors
    /// Returns `DomainError::AmountUnderflow` when `other > self`
    pub fn checked_sub(self, other: Amount) -> Result<Amount, DomainError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| DomainError::AmountUnderflow(format!("{} - {}", self.0, other.0)))
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// The smaller of two amounts
    pub fn min(self, other: Amount) -> Amount {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Asset
// =============================================================================

/// Asset identifies a token by ticker (e.g., "CRV", "WETH")
///
/// # Invariants
/// - Non-empty, at most 16 characters
/// - Uppercase ASCII alphanumeric only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset(String);

impl Asset {
    /// Create an Asset from a ticker string
    ///
    /// # Examples
    /// ```
    /// # use scythe_domain::value_objects::Asset;
    /// let crv = Asset::new("CRV").unwrap();
    /// assert_eq!(crv.as_str(), "CRV");
    /// ```
    ///
    /// # Errors
    /// Returns `DomainError::InvalidAsset` if the ticker is empty, too long
    /// or contains anything other than uppercase ASCII alphanumerics
    pub fn new(ticker: &str) -> Result<Self, DomainError> {
        if ticker.is_empty() || ticker.len() > 16 {
            return Err(DomainError::InvalidAsset(format!(
                "Ticker must be 1-16 characters, got {:?}",
                ticker
            )));
        }
        if !ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(DomainError::InvalidAsset(format!(
                "Ticker must be uppercase ASCII alphanumeric, got {:?}",
                ticker
            )));
        }
        Ok(Self(ticker.to_string()))
    }

    /// Get the ticker string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// BasisPoints
// =============================================================================

/// BasisPoints represents a rate out of 10,000
///
/// Used for the reward keep rate. Validation happens here, at
/// configuration time, never during distribution.
///
/// # Invariants
/// - Value is within [0, 10000]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BasisPoints(u16);

impl BasisPoints {
    /// The full-rate denominator (100%)
    pub const MAX: BasisPoints = BasisPoints(10_000);

    /// The zero rate
    pub const ZERO: BasisPoints = BasisPoints(0);

    /// Create a rate with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidBasisPoints` if value > 10000
    pub fn new(value: u16) -> Result<Self, DomainError> {
        if value > 10_000 {
            return Err(DomainError::InvalidBasisPoints(format!(
                "Rate must be <= 10000, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the raw basis-point value
    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

// =============================================================================
// FeeTier
// =============================================================================

/// FeeTier is a swap pool fee in hundredths of a basis point
///
/// Common tiers: 500 (0.05%), 3000 (0.3%), 10000 (1%).
///
/// # Invariants
/// - Nonzero, at most 1,000,000 (100%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeTier(u32);

impl FeeTier {
    /// Create a fee tier with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidFeeTier` for zero or > 1,000,000
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 || value > 1_000_000 {
            return Err(DomainError::InvalidFeeTier(format!(
                "Fee tier must be within (0, 1000000], got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the raw fee value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
