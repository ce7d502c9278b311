// 🔢 ATM PIN - validated value type
//
// A Pin can only be built through Pin::parse, so every PIN the registry
// stores is exactly 4 ASCII digits no matter who calls it.

use std::fmt;

use crate::error::{BankError, Result};

/// Number of digits in an ATM PIN
pub const PIN_LENGTH: usize = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// Validate and wrap a PIN
    ///
    /// Surrounding whitespace is ignored; anything else that is not exactly
    /// four ASCII digits is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if Self::is_valid(trimmed) {
            Ok(Pin(trimmed.to_string()))
        } else {
            Err(BankError::InvalidPin)
        }
    }

    /// Check PIN format without building one
    pub fn is_valid(candidate: &str) -> bool {
        candidate.len() == PIN_LENGTH && candidate.bytes().all(|b| b.is_ascii_digit())
    }

    /// Exact string comparison against a candidate
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

// Never print the digits, not even in debug logs
impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}
