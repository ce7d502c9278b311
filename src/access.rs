// 🔐 Access Layer - roles as data, checked on every call
//
// The registry itself does not know who is calling. Sessions do:
// - Authority session: every operation, any account
// - Customer session: opened by ATM login, balance + withdraw on its own account

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::entities::{AccountNumber, AccountRegistry, AccountSummary, Pin};
use crate::error::{BankError, Result};

// ============================================================================
// ROLES & OPERATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Bank staff: opens accounts, moves money, sets PINs
    Authority,

    /// ATM user, bound to one account
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateAccount,
    Deposit,
    Withdraw,
    Display,
    SetPin,
    CheckBalance,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Authority => "Bank Authority",
            Role::Customer => "ATM Customer",
        }
    }

    /// Permission table
    pub fn permits(&self, operation: Operation) -> bool {
        match self {
            Role::Authority => true,
            Role::Customer => matches!(operation, Operation::CheckBalance | Operation::Withdraw),
        }
    }
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateAccount => "create accounts",
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdraw",
            Operation::Display => "display accounts",
            Operation::SetPin => "set ATM PINs",
            Operation::CheckBalance => "check balances",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Role-bound handle on the registry
pub struct Session<'a> {
    registry: &'a mut AccountRegistry,
    role: Role,
    /// Set for customer sessions: the only account they may touch
    bound_account: Option<AccountNumber>,
}

impl<'a> Session<'a> {
    /// Open a session with full authority
    pub fn authority(registry: &'a mut AccountRegistry) -> Self {
        Session {
            registry,
            role: Role::Authority,
            bound_account: None,
        }
    }

    /// ATM login: verify the PIN and bind the session to that account
    pub fn atm_login(registry: &'a mut AccountRegistry, number: AccountNumber, pin: &str) -> Result<Self> {
        if registry.find(number).is_none() {
            return Err(BankError::AccountNotFound(number));
        }
        if !registry.authenticate(number, pin) {
            return Err(BankError::IncorrectPin(number));
        }

        info!(number = %number, "ATM session opened");
        Ok(Session {
            registry,
            role: Role::Customer,
            bound_account: Some(number),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Account a customer session is bound to
    pub fn account(&self) -> Option<AccountNumber> {
        self.bound_account
    }

    fn require(&self, operation: Operation, target: Option<AccountNumber>) -> Result<()> {
        let denied = || {
            warn!(role = %self.role, operation = %operation, "Permission denied");
            BankError::PermissionDenied {
                role: self.role,
                operation,
            }
        };

        if !self.role.permits(operation) {
            return Err(denied());
        }
        match (self.bound_account, target) {
            (Some(own), Some(target)) if own != target => Err(denied()),
            _ => Ok(()),
        }
    }

    pub fn create_account(&mut self, holder_name: &str, pin: Pin, initial_deposit: Decimal) -> Result<AccountNumber> {
        self.require(Operation::CreateAccount, None)?;
        self.registry.create_account(holder_name, pin, initial_deposit)
    }

    pub fn deposit(&mut self, number: AccountNumber, amount: Decimal) -> Result<Decimal> {
        self.require(Operation::Deposit, Some(number))?;
        self.registry.deposit(number, amount)
    }

    pub fn withdraw(&mut self, number: AccountNumber, amount: Decimal) -> Result<Decimal> {
        self.require(Operation::Withdraw, Some(number))?;
        self.registry.withdraw(number, amount)
    }

    pub fn display(&self, number: AccountNumber) -> Result<AccountSummary> {
        self.require(Operation::Display, Some(number))?;
        self.registry.display(number)
    }

    pub fn set_pin(&mut self, number: AccountNumber, pin: Pin) -> Result<()> {
        self.require(Operation::SetPin, Some(number))?;
        self.registry.set_pin(number, pin)
    }

    pub fn balance(&self, number: AccountNumber) -> Result<Decimal> {
        self.require(Operation::CheckBalance, Some(number))?;
        self.registry.balance(number)
    }
}
