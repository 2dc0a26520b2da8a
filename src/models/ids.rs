//! Account number newtype
//!
//! Account numbers are 8-digit numeric strings and serve as the key of the
//! ledger mapping. A newtype keeps them from being mixed up with holder names
//! or other free-form text.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Smallest generated account number
pub const ACCOUNT_NUMBER_MIN: u32 = 10_000_000;

/// Largest generated account number
pub const ACCOUNT_NUMBER_MAX: u32 = 99_999_999;

/// Unique, immutable identifier of an account
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Generate a random 8-digit account number from the given RNG
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let n = rng.gen_range(ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX);
        Self(n.to_string())
    }

    /// Parse a user-supplied account number, requiring exactly 8 digits
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let s = s.trim();
        if Self::is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(LedgerError::Validation(format!(
                "Invalid account number '{}': expected 8 digits",
                s
            )))
        }
    }

    /// Wrap a key read back from the data file without re-validating it
    pub(crate) fn from_stored(s: String) -> Self {
        Self(s)
    }

    /// Whether `s` has the shape of a generated account number
    pub fn is_well_formed(s: &str) -> bool {
        s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) && !s.starts_with('0')
    }

    /// Get the account number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Lets the ledger map be queried with a plain &str
impl Borrow<str> for AccountNumber {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AccountNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_generated_numbers_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let number = AccountNumber::generate_with(&mut rng);
            assert!(AccountNumber::is_well_formed(number.as_str()), "{}", number);
        }
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let a = AccountNumber::generate_with(&mut StdRng::seed_from_u64(42));
        let b = AccountNumber::generate_with(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse() {
        assert_eq!(AccountNumber::parse("12345678").unwrap().as_str(), "12345678");
        assert_eq!(AccountNumber::parse(" 87654321\n").unwrap().as_str(), "87654321");
        assert!(AccountNumber::parse("1234567").is_err());
        assert!(AccountNumber::parse("123456789").is_err());
        assert!(AccountNumber::parse("01234567").is_err());
        assert!(AccountNumber::parse("1234567a").is_err());
    }

    #[test]
    fn test_from_str() {
        let number: AccountNumber = "55555555".parse().unwrap();
        assert_eq!(number.to_string(), "55555555");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let number = AccountNumber::parse("12345678").unwrap();
        assert_eq!(serde_json::to_string(&number).unwrap(), "\"12345678\"");
    }
}
