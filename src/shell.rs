// 🖥️ Interaction Shell - text menus for the bank authority and the ATM
//
// Reads from any BufRead, writes to any Write, so tests can script a whole
// session. Every action goes through an access::Session; no failure ends
// the loop, only end of input or an I/O error does.

use anyhow::Result;
use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::access::Session;
use crate::config::BankConfig;
use crate::entities::{AccountNumber, AccountRegistry, AccountSummary, Pin};
use crate::error::BankError;

/// What the caller should do after a menu returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Result of reading one field
enum Step<T> {
    Value(T),
    /// Unusable input, already reported: back to the menu
    Back,
    /// End of input
    Quit,
}

/// Unwrap a field or leave the current menu
macro_rules! step {
    ($step:expr) => {
        match $step {
            Step::Value(value) => value,
            Step::Back => return Ok(Flow::Continue),
            Step::Quit => return Ok(Flow::Quit),
        }
    };
}

// ============================================================================
// CONSOLE (line I/O + formatting)
// ============================================================================

struct Console<R, W> {
    input: R,
    output: W,
    config: BankConfig,
}

impl<R: BufRead, W: Write> Console<R, W> {
    fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", line.as_ref())?;
        Ok(())
    }

    /// Print a label and read one line; None at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn money(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.config.currency_symbol, amount)
    }

    fn read_text(&mut self, label: &str) -> Result<Step<String>> {
        Ok(match self.prompt(label)? {
            Some(line) => Step::Value(line),
            None => Step::Quit,
        })
    }

    fn read_account_number(&mut self) -> Result<Step<AccountNumber>> {
        let Some(line) = self.prompt("Enter 6-digit Account Number: ")? else {
            return Ok(Step::Quit);
        };
        match line.parse::<AccountNumber>() {
            Ok(number) => Ok(Step::Value(number)),
            Err(e) => {
                self.report(&e)?;
                Ok(Step::Back)
            }
        }
    }

    /// Read an amount; a blank line counts as zero when `blank_is_zero`
    fn read_amount(&mut self, label: &str, blank_is_zero: bool) -> Result<Step<Decimal>> {
        let Some(line) = self.prompt(label)? else {
            return Ok(Step::Quit);
        };
        if line.is_empty() && blank_is_zero {
            return Ok(Step::Value(Decimal::ZERO));
        }
        match Decimal::from_str(&line) {
            Ok(amount) => Ok(Step::Value(amount)),
            Err(_) => {
                self.say("Invalid amount! Enter a number such as 25 or 19.99.")?;
                Ok(Step::Back)
            }
        }
    }

    /// Ask until a valid 4-digit PIN is entered
    fn read_new_pin(&mut self) -> Result<Step<Pin>> {
        loop {
            let Some(line) = self.prompt("Set 4-digit ATM PIN: ")? else {
                return Ok(Step::Quit);
            };
            match Pin::parse(&line) {
                Ok(pin) => return Ok(Step::Value(pin)),
                Err(e) => self.report(&e)?,
            }
        }
    }

    /// Print the user-facing message for an error
    fn report(&mut self, error: &BankError) -> Result<()> {
        let message = match error {
            BankError::AccountNotFound(_) => "Account not found!".to_string(),
            BankError::InvalidAccountNumber(_) => {
                "Invalid account number! It must be 6 digits.".to_string()
            }
            BankError::InvalidAmount(_) => "Invalid amount!".to_string(),
            BankError::BalanceOverflow(_) => {
                "Deposit rejected: the balance cannot hold that much!".to_string()
            }
            BankError::InsufficientFunds { available, .. } => format!(
                "Invalid withdrawal amount! Available balance: {}",
                self.money(*available)
            ),
            BankError::InvalidPin => "PIN must be exactly 4 digits!".to_string(),
            BankError::IncorrectPin(_) => "Invalid ATM PIN!".to_string(),
            BankError::InvalidHolderName => "Account holder name cannot be empty!".to_string(),
            BankError::PermissionDenied { .. } => format!("Permission denied: {}", error),
            BankError::NumberSpaceExhausted => {
                "No account numbers left! Cannot open more accounts.".to_string()
            }
        };
        self.say(message)
    }

    fn show_summary(&mut self, summary: &AccountSummary) -> Result<()> {
        if self.config.json_display {
            let json = serde_json::to_string_pretty(summary)?;
            return self.say(json);
        }

        self.say(format!("Account Number: {}", summary.number))?;
        self.say(format!("Account Holder: {}", summary.holder_name))?;
        self.say(format!("Balance: {}", self.money(summary.balance)))?;
        self.say(format!(
            "Opened: {}",
            summary.opened_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
    }
}

// ============================================================================
// SHELL
// ============================================================================

pub struct Shell<R, W> {
    registry: AccountRegistry,
    console: Console<R, W>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(registry: AccountRegistry, config: BankConfig, input: R, output: W) -> Self {
        Shell {
            registry,
            console: Console {
                input,
                output,
                config,
            },
        }
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// Hand back the registry and the output sink
    pub fn into_parts(self) -> (AccountRegistry, W) {
        (self.registry, self.console.output)
    }

    /// Main menu loop; returns when the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            let title = format!("\n*** {} ***", self.console.config.bank_name);
            self.console.say(title)?;
            self.console.say("1. Bank Authority")?;
            self.console.say("2. User (ATM)")?;
            self.console.say("3. Exit")?;

            let Some(choice) = self.console.prompt("Enter your choice: ")? else {
                break;
            };
            let flow = match choice.as_str() {
                "1" => self.authority_menu()?,
                "2" => self.atm()?,
                "3" => Flow::Quit,
                _ => {
                    self.console.say("Invalid choice! Try again.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }

        self.console.say("Exiting...")
    }

    fn authority_menu(&mut self) -> Result<Flow> {
        self.console.say("\n*** Bank Authority Menu ***")?;
        self.console.say("1. Create Account")?;
        self.console.say("2. Deposit")?;
        self.console.say("3. Withdraw")?;
        self.console.say("4. Display Account")?;
        self.console.say("5. Set ATM PIN")?;

        let choice = step!(self.console.read_text("Enter your choice: ")?);
        match choice.as_str() {
            "1" => self.create_account(),
            "2" => self.deposit(),
            "3" => self.withdraw(),
            "4" => self.display(),
            "5" => self.set_pin(),
            _ => {
                self.console.say("Invalid choice!")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn create_account(&mut self) -> Result<Flow> {
        let name = step!(self.console.read_text("Enter Account Holder Name: ")?);
        let pin = step!(self.console.read_new_pin()?);
        let initial = step!(self
            .console
            .read_amount("Enter Initial Deposit (blank for 0): ", true)?);

        let result = Session::authority(&mut self.registry).create_account(&name, pin, initial);
        match result {
            Ok(number) => self.console.say(format!(
                "Account created successfully! Your Account Number is: {}",
                number
            ))?,
            Err(BankError::InvalidAmount(_)) => self.console.say("Invalid initial deposit amount!")?,
            Err(e) => self.console.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn deposit(&mut self) -> Result<Flow> {
        let number = step!(self.console.read_account_number()?);
        let amount = step!(self.console.read_amount("Enter Deposit Amount: ", false)?);

        let result = Session::authority(&mut self.registry).deposit(number, amount);
        match result {
            Ok(balance) => {
                let line = format!(
                    "Deposited {}. New Balance: {}",
                    self.console.money(amount),
                    self.console.money(balance)
                );
                self.console.say(line)?
            }
            Err(BankError::InvalidAmount(_)) => self.console.say("Invalid deposit amount!")?,
            Err(e) => self.console.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn withdraw(&mut self) -> Result<Flow> {
        let number = step!(self.console.read_account_number()?);
        let amount = step!(self.console.read_amount("Enter Withdrawal Amount: ", false)?);

        let mut session = Session::authority(&mut self.registry);
        withdraw_and_report(&mut session, &mut self.console, number, amount)?;
        Ok(Flow::Continue)
    }

    fn display(&mut self) -> Result<Flow> {
        let number = step!(self.console.read_account_number()?);

        match Session::authority(&mut self.registry).display(number) {
            Ok(summary) => self.console.show_summary(&summary)?,
            Err(e) => self.console.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn set_pin(&mut self) -> Result<Flow> {
        let number = step!(self.console.read_account_number()?);
        if self.registry.find(number).is_none() {
            self.console.report(&BankError::AccountNotFound(number))?;
            return Ok(Flow::Continue);
        }
        let pin = step!(self.console.read_new_pin()?);

        let result = Session::authority(&mut self.registry).set_pin(number, pin);
        match result {
            Ok(()) => self.console.say("ATM PIN set successfully.")?,
            Err(e) => self.console.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn atm(&mut self) -> Result<Flow> {
        let number = step!(self.console.read_account_number()?);
        let pin = step!(self.console.read_text("Enter 4-digit ATM PIN: ")?);

        let mut session = match Session::atm_login(&mut self.registry, number, &pin) {
            Ok(session) => session,
            Err(e) => {
                self.console.report(&e)?;
                return Ok(Flow::Continue);
            }
        };

        loop {
            self.console.say("\n*** ATM Menu ***")?;
            self.console.say("1. Check Balance")?;
            self.console.say("2. Withdraw")?;
            self.console.say("3. Exit ATM")?;

            let Some(choice) = self.console.prompt("Enter your choice: ")? else {
                return Ok(Flow::Quit);
            };
            match choice.as_str() {
                "1" => match session.balance(number) {
                    Ok(balance) => {
                        let line = format!("Balance: {}", self.console.money(balance));
                        self.console.say(line)?;
                    }
                    Err(e) => self.console.report(&e)?,
                },
                "2" => match self.console.read_amount("Enter Withdrawal Amount: ", false)? {
                    Step::Value(amount) => {
                        withdraw_and_report(&mut session, &mut self.console, number, amount)?
                    }
                    Step::Back => {}
                    Step::Quit => return Ok(Flow::Quit),
                },
                "3" => {
                    self.console.say("Exiting ATM...")?;
                    return Ok(Flow::Continue);
                }
                _ => self.console.say("Invalid choice! Try again.")?,
            }
        }
    }
}

/// Shared by the authority desk and the ATM
fn withdraw_and_report<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    console: &mut Console<R, W>,
    number: AccountNumber,
    amount: Decimal,
) -> Result<()> {
    match session.withdraw(number, amount) {
        Ok(remaining) => {
            let line = format!(
                "Withdrew {}. Remaining Balance: {}",
                console.money(amount),
                console.money(remaining)
            );
            console.say(line)
        }
        Err(BankError::InvalidAmount(_)) => console.say("Invalid withdrawal amount!"),
        Err(e) => console.report(&e),
    }
}

// ============================================================================
// TESTS
// ============================================================================
