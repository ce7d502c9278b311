// 💳 Account Entity + Account Registry
//
// "Account number is IDENTITY (never changes), balance is a VALUE"
//
// - Account number: random 6-digit identifier, unique per registry
// - Balance: fixed-point decimal, never negative
// - PIN: validated Pin value, overwritten only by the authority
// - Registry: in-memory map keyed by account number, nothing persisted

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::pin::Pin;
use crate::error::{BankError, Result};

// ============================================================================
// ACCOUNT NUMBER
// ============================================================================

/// 6-digit account number in [100000, 999999]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AccountNumber(u32);

impl AccountNumber {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    /// How many distinct numbers a registry can ever issue
    pub const CAPACITY: usize = (Self::MAX - Self::MIN + 1) as usize;

    pub fn new(value: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(AccountNumber(value))
        } else {
            Err(BankError::InvalidAccountNumber(value.to_string()))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for AccountNumber {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let value: u32 = trimmed
            .parse()
            .map_err(|_| BankError::InvalidAccountNumber(trimmed.to_string()))?;
        AccountNumber::new(value)
    }
}

impl TryFrom<u32> for AccountNumber {
    type Error = BankError;

    fn try_from(value: u32) -> Result<Self> {
        AccountNumber::new(value)
    }
}

impl From<AccountNumber> for u32 {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// MONEY
// ============================================================================

/// Most decimal places an amount may carry (whole cents)
pub const MONEY_SCALE: u32 = 2;

/// True when the amount has no digits below a cent ("1.50" and "1.500" pass, "0.004" does not)
pub fn is_cent_precise(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

/// A customer account
///
/// Identity: `number` (assigned by the registry, never changes)
/// Values: balance and PIN (change through registry operations)
#[derive(Debug, Clone)]
pub struct Account {
    number: AccountNumber,
    holder_name: String,
    balance: Decimal,
    pin: Pin,
    opened_at: DateTime<Utc>,
}

impl Account {
    fn new(number: AccountNumber, holder_name: String, pin: Pin, opening_balance: Decimal) -> Self {
        Account {
            number,
            holder_name,
            balance: opening_balance,
            pin,
            opened_at: Utc::now(),
        }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Add funds; returns the new balance
    ///
    /// The balance is untouched when the sum would not fit in a Decimal.
    fn deposit(&mut self, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO || !is_cent_precise(amount) {
            return Err(BankError::InvalidAmount(amount));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(BankError::BalanceOverflow(amount))?;
        Ok(self.balance)
    }

    /// Remove funds; returns the remaining balance
    ///
    /// Rejected (balance untouched) when the amount is not positive, finer
    /// than a cent, or exceeds the balance.
    fn withdraw(&mut self, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO || !is_cent_precise(amount) {
            return Err(BankError::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(BankError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }

    fn verify_pin(&self, candidate: &str) -> bool {
        self.pin.matches(candidate)
    }

    /// Read-only view for reports
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            number: self.number,
            holder_name: self.holder_name.clone(),
            balance: self.balance,
            opened_at: self.opened_at,
        }
    }
}

/// What `display` reports about an account (never includes the PIN)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub number: AccountNumber,
    pub holder_name: String,
    pub balance: Decimal,
    pub opened_at: DateTime<Utc>,
}

// ============================================================================
// ACCOUNT REGISTRY
// ============================================================================

/// Registry of all accounts opened during this run
///
/// Accounts live for the whole process; there is no delete. The map's key
/// set is the only record of issued numbers.
pub struct AccountRegistry {
    accounts: BTreeMap<AccountNumber, Account>,
    rng: StdRng,
}

impl AccountRegistry {
    /// Create new empty registry with an entropy-seeded number generator
    pub fn new() -> Self {
        AccountRegistry {
            accounts: BTreeMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create new empty registry with reproducible account numbers
    pub fn with_seed(seed: u64) -> Self {
        AccountRegistry {
            accounts: BTreeMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a random 6-digit number not yet in use
    fn generate_number(&mut self) -> Result<AccountNumber> {
        if self.accounts.len() >= AccountNumber::CAPACITY {
            return Err(BankError::NumberSpaceExhausted);
        }
        loop {
            let candidate = AccountNumber(self.rng.gen_range(AccountNumber::MIN..=AccountNumber::MAX));
            if !self.accounts.contains_key(&candidate) {
                return Ok(candidate);
            }
            debug!(number = %candidate, "Account number collision, resampling");
        }
    }

    /// Open a new account and return its number
    ///
    /// `initial_deposit` may be zero but not negative, and must be whole cents.
    pub fn create_account(
        &mut self,
        holder_name: &str,
        pin: Pin,
        initial_deposit: Decimal,
    ) -> Result<AccountNumber> {
        let holder_name = holder_name.trim();
        if holder_name.is_empty() {
            warn!("Rejected account with empty holder name");
            return Err(BankError::InvalidHolderName);
        }
        if initial_deposit < Decimal::ZERO || !is_cent_precise(initial_deposit) {
            warn!(amount = %initial_deposit, "Rejected opening deposit");
            return Err(BankError::InvalidAmount(initial_deposit));
        }

        let number = self.generate_number()?;
        let account = Account::new(number, holder_name.to_string(), pin, initial_deposit);
        self.accounts.insert(number, account);

        info!(number = %number, opening_balance = %initial_deposit, "Account created");
        Ok(number)
    }

    /// Find account by number
    pub fn find(&self, number: AccountNumber) -> Option<&Account> {
        self.accounts.get(&number)
    }

    fn find_mut(&mut self, number: AccountNumber) -> Result<&mut Account> {
        self.accounts
            .get_mut(&number)
            .ok_or(BankError::AccountNotFound(number))
    }

    /// Deposit into an account; returns the new balance
    pub fn deposit(&mut self, number: AccountNumber, amount: Decimal) -> Result<Decimal> {
        let result = self.find_mut(number)?.deposit(amount);
        match &result {
            Ok(balance) => info!(number = %number, amount = %amount, balance = %balance, "Deposit"),
            Err(e) => warn!(number = %number, error = %e, "Deposit rejected"),
        }
        result
    }

    /// Withdraw from an account; returns the remaining balance
    pub fn withdraw(&mut self, number: AccountNumber, amount: Decimal) -> Result<Decimal> {
        let result = self.find_mut(number)?.withdraw(amount);
        match &result {
            Ok(balance) => info!(number = %number, amount = %amount, balance = %balance, "Withdrawal"),
            Err(e) => warn!(number = %number, error = %e, "Withdrawal rejected"),
        }
        result
    }

    /// Overwrite the ATM PIN
    pub fn set_pin(&mut self, number: AccountNumber, pin: Pin) -> Result<()> {
        self.find_mut(number)?.pin = pin;
        info!(number = %number, "ATM PIN changed");
        Ok(())
    }

    /// Check a PIN; unknown accounts never authenticate
    pub fn authenticate(&self, number: AccountNumber, pin: &str) -> bool {
        let ok = self
            .find(number)
            .map(|account| account.verify_pin(pin))
            .unwrap_or(false);
        if !ok {
            warn!(number = %number, "Authentication failed");
        }
        ok
    }

    /// Report number, holder and balance
    pub fn display(&self, number: AccountNumber) -> Result<AccountSummary> {
        self.find(number)
            .map(Account::summary)
            .ok_or(BankError::AccountNotFound(number))
    }

    /// Current balance of an account
    pub fn balance(&self, number: AccountNumber) -> Result<Decimal> {
        self.find(number)
            .map(Account::balance)
            .ok_or(BankError::AccountNotFound(number))
    }

    /// All accounts, ordered by number
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn pin(s: &str) -> Pin {
        Pin::parse(s).unwrap()
    }

    fn registry_with_alice() -> (AccountRegistry, AccountNumber) {
        let mut registry = AccountRegistry::with_seed(7);
        let number = registry
            .create_account("Alice", pin("1234"), Decimal::ZERO)
            .unwrap();
        (registry, number)
    }

    #[test]
    fn test_account_number_range() {
        assert!(AccountNumber::new(100_000).is_ok());
        assert!(AccountNumber::new(999_999).is_ok());
        assert!(AccountNumber::new(99_999).is_err());
        assert!(AccountNumber::new(1_000_000).is_err());
        assert_eq!(AccountNumber::CAPACITY, 900_000);
    }

    #[test]
    fn test_account_number_from_str() {
        assert_eq!("123456".parse::<AccountNumber>().unwrap().value(), 123_456);
        assert_eq!(" 654321 ".parse::<AccountNumber>().unwrap().value(), 654_321);
        assert!(matches!(
            "12ab56".parse::<AccountNumber>(),
            Err(BankError::InvalidAccountNumber(_))
        ));
        assert!("12345".parse::<AccountNumber>().is_err());
        assert!("-123456".parse::<AccountNumber>().is_err());
    }

    #[test]
    fn test_create_account() {
        let mut registry = AccountRegistry::with_seed(1);
        let number = registry
            .create_account("  Bob Smith ", pin("4321"), dec("25.50"))
            .unwrap();

        let account = registry.find(number).unwrap();
        assert_eq!(account.number(), number);
        assert_eq!(account.holder_name(), "Bob Smith");
        assert_eq!(account.balance(), dec("25.50"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_account_rejects_bad_input() {
        let mut registry = AccountRegistry::with_seed(1);

        let empty_name = registry.create_account("   ", pin("1234"), Decimal::ZERO);
        assert_eq!(empty_name, Err(BankError::InvalidHolderName));

        let negative = registry.create_account("Carol", pin("1234"), dec("-1"));
        assert_eq!(negative, Err(BankError::InvalidAmount(dec("-1"))));

        assert!(registry.is_empty());
    }

    #[test]
    fn test_generated_numbers_in_range_and_unique() {
        let mut registry = AccountRegistry::with_seed(42);
        let mut seen = HashSet::new();

        // Enough accounts that the generator is certain to hit collisions
        for i in 0..3000 {
            let number = registry
                .create_account(&format!("Holder {}", i), pin("0000"), Decimal::ZERO)
                .unwrap();
            assert!((AccountNumber::MIN..=AccountNumber::MAX).contains(&number.value()));
            assert!(seen.insert(number), "number {} issued twice", number);
        }

        assert_eq!(registry.len(), 3000);
    }

    #[test]
    fn test_same_seed_same_numbers() {
        let mut a = AccountRegistry::with_seed(99);
        let mut b = AccountRegistry::with_seed(99);

        for _ in 0..5 {
            let na = a.create_account("A", pin("1111"), Decimal::ZERO).unwrap();
            let nb = b.create_account("B", pin("2222"), Decimal::ZERO).unwrap();
            assert_eq!(na, nb);
        }
    }

    #[test]
    fn test_find_unknown_account() {
        let (registry, number) = registry_with_alice();
        let other = AccountNumber::new(if number.value() == 100_000 { 100_001 } else { 100_000 }).unwrap();

        assert!(registry.find(number).is_some());
        assert!(registry.find(other).is_none());
        assert_eq!(registry.display(other), Err(BankError::AccountNotFound(other)));
        assert_eq!(registry.balance(other), Err(BankError::AccountNotFound(other)));
    }

    #[test]
    fn test_deposit() {
        let (mut registry, number) = registry_with_alice();

        assert_eq!(registry.deposit(number, dec("10.25")).unwrap(), dec("10.25"));
        assert_eq!(registry.deposit(number, dec("0.75")).unwrap(), dec("11.00"));
        assert_eq!(registry.balance(number).unwrap(), dec("11"));
    }

    #[test]
    fn test_deposit_non_positive_is_rejected() {
        let (mut registry, number) = registry_with_alice();
        registry.deposit(number, dec("40")).unwrap();

        assert_eq!(
            registry.deposit(number, Decimal::ZERO),
            Err(BankError::InvalidAmount(Decimal::ZERO))
        );
        assert_eq!(
            registry.deposit(number, dec("-5")),
            Err(BankError::InvalidAmount(dec("-5")))
        );
        assert_eq!(registry.balance(number).unwrap(), dec("40"));
    }

    #[test]
    fn test_withdraw() {
        let (mut registry, number) = registry_with_alice();
        registry.deposit(number, dec("100")).unwrap();

        assert_eq!(registry.withdraw(number, dec("30.10")).unwrap(), dec("69.90"));
        assert_eq!(registry.withdraw(number, dec("69.90")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_withdraw_rejections_leave_balance() {
        let (mut registry, number) = registry_with_alice();
        registry.deposit(number, dec("20")).unwrap();

        assert_eq!(
            registry.withdraw(number, dec("20.01")),
            Err(BankError::InsufficientFunds {
                requested: dec("20.01"),
                available: dec("20"),
            })
        );
        assert_eq!(
            registry.withdraw(number, Decimal::ZERO),
            Err(BankError::InvalidAmount(Decimal::ZERO))
        );
        assert_eq!(
            registry.withdraw(number, dec("-3")),
            Err(BankError::InvalidAmount(dec("-3")))
        );
        assert_eq!(registry.balance(number).unwrap(), dec("20"));
    }

    #[test]
    fn test_operations_on_unknown_account() {
        let mut registry = AccountRegistry::with_seed(3);
        let ghost = AccountNumber::new(555_555).unwrap();

        assert_eq!(registry.deposit(ghost, dec("1")), Err(BankError::AccountNotFound(ghost)));
        assert_eq!(registry.withdraw(ghost, dec("1")), Err(BankError::AccountNotFound(ghost)));
        assert_eq!(registry.set_pin(ghost, pin("1234")), Err(BankError::AccountNotFound(ghost)));
        assert!(!registry.authenticate(ghost, "1234"));
    }

    #[test]
    fn test_authenticate_follows_latest_pin() {
        let (mut registry, number) = registry_with_alice();

        assert!(registry.authenticate(number, "1234"));
        assert!(!registry.authenticate(number, "0000"));

        registry.set_pin(number, pin("0000")).unwrap();
        assert!(registry.authenticate(number, "0000"));
        assert!(!registry.authenticate(number, "1234"));
    }

    #[test]
    fn test_display_summary() {
        let (mut registry, number) = registry_with_alice();
        registry.deposit(number, dec("12.34")).unwrap();

        let summary = registry.display(number).unwrap();
        assert_eq!(summary.number, number);
        assert_eq!(summary.holder_name, "Alice");
        assert_eq!(summary.balance, dec("12.34"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["number"], number.value());
        assert_eq!(json["balance"], "12.34");
        assert!(json.get("pin").is_none());
    }

    #[test]
    fn test_accounts_are_ordered_by_number() {
        let mut registry = AccountRegistry::with_seed(5);
        for name in ["A", "B", "C", "D"] {
            registry.create_account(name, pin("1234"), Decimal::ZERO).unwrap();
        }

        let numbers: Vec<AccountNumber> = registry.accounts().map(Account::number).collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers, sorted);
        assert_eq!(numbers.len(), 4);
    }

    #[test]
    fn test_alice_scenario() {
        let mut registry = AccountRegistry::new();
        let number = registry
            .create_account("Alice", pin("1234"), Decimal::ZERO)
            .unwrap();

        assert_eq!(registry.deposit(number, dec("100.0")).unwrap(), dec("100.0"));
        assert_eq!(registry.deposit(number, dec("50.0")).unwrap(), dec("150.0"));

        assert!(registry.withdraw(number, dec("200.0")).is_err());
        assert_eq!(registry.balance(number).unwrap(), dec("150.0"));

        assert_eq!(registry.withdraw(number, dec("150.0")).unwrap(), dec("0.0"));
        assert_eq!(registry.balance(number).unwrap(), Decimal::ZERO);

        assert!(registry.authenticate(number, "1234"));
        assert!(!registry.authenticate(number, "0000"));
    }

    #[test]
    fn test_deposit_overflow_is_rejected() {
        let mut registry = AccountRegistry::with_seed(8);
        let number = registry
            .create_account("Rich", pin("1111"), Decimal::MAX)
            .unwrap();

        assert_eq!(
            registry.deposit(number, Decimal::ONE),
            Err(BankError::BalanceOverflow(Decimal::ONE))
        );
        assert_eq!(registry.balance(number).unwrap(), Decimal::MAX);

        // Still usable afterwards
        assert_eq!(
            registry.withdraw(number, Decimal::ONE).unwrap(),
            Decimal::MAX - Decimal::ONE
        );
    }

    #[test]
    fn test_sub_cent_amounts_are_rejected() {
        let (mut registry, number) = registry_with_alice();
        registry.deposit(number, dec("10")).unwrap();

        assert_eq!(
            registry.deposit(number, dec("0.004")),
            Err(BankError::InvalidAmount(dec("0.004")))
        );
        assert_eq!(
            registry.withdraw(number, dec("1.999")),
            Err(BankError::InvalidAmount(dec("1.999")))
        );
        assert_eq!(
            registry.create_account("Dave", pin("2222"), dec("5.005")),
            Err(BankError::InvalidAmount(dec("5.005")))
        );
        assert_eq!(registry.balance(number).unwrap(), dec("10"));
        assert_eq!(registry.len(), 1);

        // Trailing zeros are still whole cents
        assert_eq!(registry.deposit(number, dec("1.500")).unwrap(), dec("11.50"));
    }

    #[test]
    fn test_cent_precision() {
        assert!(is_cent_precise(dec("12")));
        assert!(is_cent_precise(dec("12.3")));
        assert!(is_cent_precise(dec("12.34")));
        assert!(is_cent_precise(dec("12.3400")));
        assert!(!is_cent_precise(dec("12.345")));
        assert!(!is_cent_precise(dec("0.001")));
    }

    #[test]
    fn test_number_space_exhausted() {
        let mut registry = AccountRegistry::with_seed(13);
        let template = Account::new(
            AccountNumber(AccountNumber::MIN),
            "Filler".to_string(),
            pin("0000"),
            Decimal::ZERO,
        );
        for value in AccountNumber::MIN..=AccountNumber::MAX {
            let mut account = template.clone();
            account.number = AccountNumber(value);
            registry.accounts.insert(account.number, account);
        }
        assert_eq!(registry.len(), AccountNumber::CAPACITY);

        assert_eq!(
            registry.create_account("One Too Many", pin("1234"), Decimal::ZERO),
            Err(BankError::NumberSpaceExhausted)
        );
        assert_eq!(registry.len(), AccountNumber::CAPACITY);
    }
}
