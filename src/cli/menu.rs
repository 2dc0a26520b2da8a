//! Interactive menu
//!
//! Reads plain-text answers line by line, calls into the ledger and saves
//! after every mutating option. Business-rule failures (missing account,
//! insufficient funds, bad amounts) are reported and the loop continues.

use std::io::{BufRead, Lines, Write};

use crate::display::format_receipt;
use crate::error::{LedgerError, LedgerResult};
use crate::services::Ledger;

/// A menu option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateAccount,
    Deposit,
    Withdraw,
    Transfer,
    ViewReceipt,
    Exit,
}

impl MenuChoice {
    /// Parse the number typed at the menu prompt
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(Self::CreateAccount),
            "2" => Some(Self::Deposit),
            "3" => Some(Self::Withdraw),
            "4" => Some(Self::Transfer),
            "5" => Some(Self::ViewReceipt),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Line-oriented prompt over any reader/writer pair
struct Prompter<R, W> {
    lines: Lines<R>,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Print `label` and read one line; `None` at end of input
    fn ask(&mut self, label: &str) -> LedgerResult<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        match self.lines.next() {
            Some(line) => Ok(Some(line?.trim().to_string())),
            None => Ok(None),
        }
    }

    fn say(&mut self, message: impl AsRef<str>) -> LedgerResult<()> {
        writeln!(self.output, "{}", message.as_ref())?;
        Ok(())
    }
}

/// Run the menu until Exit is chosen or input ends
pub fn run_menu<R: BufRead, W: Write>(
    ledger: &mut Ledger,
    input: R,
    output: W,
) -> LedgerResult<()> {
    let mut prompter = Prompter {
        lines: input.lines(),
        output,
    };

    loop {
        prompter.say("\n--- Welcome to the Banking System ---")?;
        prompter.say("1. Create Account")?;
        prompter.say("2. Deposit Money")?;
        prompter.say("3. Withdraw Money")?;
        prompter.say("4. Transfer Money")?;
        prompter.say("5. View Receipt")?;
        prompter.say("6. Exit")?;

        let Some(answer) = prompter.ask("Choose an option: ")? else {
            prompter.say("")?;
            prompter.say("Goodbye!")?;
            return Ok(());
        };

        let outcome = match MenuChoice::parse(&answer) {
            Some(MenuChoice::Exit) => {
                prompter.say("Goodbye!")?;
                return Ok(());
            }
            Some(choice) => handle_choice(ledger, &mut prompter, choice),
            None => prompter.say("Invalid choice. Please select a valid option."),
        };

        match outcome {
            Ok(()) => {}
            Err(err) if err.is_recoverable() => report(&mut prompter, &err)?,
            // Terminal I/O failures end the session
            Err(err @ LedgerError::Io(_)) => return Err(err),
            Err(err) => prompter.say(format!("Error: {}", err))?,
        }
    }
}

fn handle_choice<R: BufRead, W: Write>(
    ledger: &mut Ledger,
    prompter: &mut Prompter<R, W>,
    choice: MenuChoice,
) -> LedgerResult<()> {
    match choice {
        MenuChoice::CreateAccount => {
            let Some(name) = prompter.ask("Enter the account holder's name: ")? else {
                return Ok(());
            };
            let number = ledger.create_account(&name)?;
            prompter.say(format!(
                "Account created successfully. Account Number: {}",
                number
            ))
        }

        MenuChoice::Deposit => {
            let Some(number) = ask_account(
                ledger,
                prompter,
                "Enter your account number: ",
                "Account not found.",
            )?
            else {
                return Ok(());
            };
            let Some(amount) = ask_amount(prompter, "Enter amount to deposit: ")? else {
                return Ok(());
            };
            let new_balance = ledger.deposit(&number, amount)?;
            ledger.save()?;
            prompter.say(format!(
                "{:.2} has been deposited. New balance: {:.2}",
                amount, new_balance
            ))
        }

        MenuChoice::Withdraw => {
            let Some(number) = ask_account(
                ledger,
                prompter,
                "Enter your account number: ",
                "Account not found.",
            )?
            else {
                return Ok(());
            };
            let Some(amount) = ask_amount(prompter, "Enter amount to withdraw: ")? else {
                return Ok(());
            };
            let new_balance = ledger.withdraw(&number, amount)?;
            ledger.save()?;
            prompter.say(format!(
                "{:.2} has been withdrawn. New balance: {:.2}",
                amount, new_balance
            ))
        }

        MenuChoice::Transfer => {
            let Some(source) = ask_account(
                ledger,
                prompter,
                "Enter your account number: ",
                "Source account not found.",
            )?
            else {
                return Ok(());
            };
            let Some(target) = ask_account(
                ledger,
                prompter,
                "Enter target account number: ",
                "Target account not found.",
            )?
            else {
                return Ok(());
            };
            let Some(amount) = ask_amount(prompter, "Enter amount to transfer: ")? else {
                return Ok(());
            };
            let new_balance = ledger.transfer(&source, &target, amount)?;
            ledger.save()?;
            prompter.say(format!(
                "Transferred {:.2} to account {}. New balance: {:.2}",
                amount, target, new_balance
            ))
        }

        MenuChoice::ViewReceipt => {
            let Some(number) = ask_account(
                ledger,
                prompter,
                "Enter your account number: ",
                "Account not found.",
            )?
            else {
                return Ok(());
            };
            let receipt = ledger.receipt(&number)?;
            write!(prompter.output, "{}", format_receipt(&receipt))?;
            Ok(())
        }

        MenuChoice::Exit => Ok(()),
    }
}

/// Ask for an account number and confirm it exists
fn ask_account<R: BufRead, W: Write>(
    ledger: &Ledger,
    prompter: &mut Prompter<R, W>,
    label: &str,
    missing: &str,
) -> LedgerResult<Option<String>> {
    let Some(number) = prompter.ask(label)? else {
        return Ok(None);
    };

    if ledger.find_account(&number).is_none() {
        prompter.say(missing)?;
        return Ok(None);
    }

    Ok(Some(number))
}

/// Ask for an amount, reporting text that is not a number
fn ask_amount<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    label: &str,
) -> LedgerResult<Option<f64>> {
    let Some(text) = prompter.ask(label)? else {
        return Ok(None);
    };

    match text.parse::<f64>() {
        Ok(amount) => Ok(Some(amount)),
        Err(_) => {
            prompter.say(format!("Invalid amount: '{}'", text))?;
            Ok(None)
        }
    }
}

/// Friendly message for an error the operator can retry after
fn report<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    err: &LedgerError,
) -> LedgerResult<()> {
    match err {
        LedgerError::InsufficientFunds { .. } => prompter.say("Insufficient funds."),
        LedgerError::NotFound { .. } => prompter.say("Account not found."),
        LedgerError::Validation(message) => prompter.say(format!("Invalid input: {}", message)),
        other => prompter.say(format!("Error: {}", other)),
    }
}
