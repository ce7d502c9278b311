// Entity Models
//
// - Account: identity is the 6-digit account number, balance and PIN change
// - Pin: validated 4-digit ATM PIN
// - AccountRegistry: owns every account opened during this run

pub mod account;
pub mod pin;

pub use account::{Account, AccountNumber, AccountRegistry, AccountSummary};
pub use pin::{Pin, PIN_LENGTH};
