// ⚠️ Bank Errors - every failure the registry can report
//
// Failures are values, never panics: the shell prints them and goes back
// to the menu.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::access::{Operation, Role};
use crate::entities::AccountNumber;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("Invalid account number: {0:?} (expected 6 digits, 100000-999999)")]
    InvalidAccountNumber(String),

    /// Non-positive or sub-cent deposit/withdrawal, or negative opening deposit
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Deposit would push the balance past the largest representable amount
    #[error("Deposit of {0} would overflow the balance")]
    BalanceOverflow(Decimal),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("PIN must be exactly 4 digits")]
    InvalidPin,

    #[error("Incorrect PIN for account {0}")]
    IncorrectPin(AccountNumber),

    #[error("Account holder name must not be empty")]
    InvalidHolderName,

    #[error("{role} is not permitted to {operation}")]
    PermissionDenied { role: Role, operation: Operation },

    #[error("All account numbers have been issued")]
    NumberSpaceExhausted,
}

pub type Result<T> = std::result::Result<T, BankError>;
