// Bank Management - Core Library
// Account registry, ATM PINs, role-checked sessions and the console shell

pub mod access;
pub mod config;
pub mod entities;
pub mod error;
pub mod shell;

// Re-export commonly used types
pub use access::{Operation, Role, Session};
pub use config::BankConfig;
pub use entities::{Account, AccountNumber, AccountRegistry, AccountSummary, Pin, PIN_LENGTH};
pub use error::{BankError, Result};
pub use shell::Shell;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
