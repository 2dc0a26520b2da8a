//! Account model
//!
//! An account keeps its holder name, balance and history only as encrypted
//! tokens. Reads decrypt on demand; every write produces fresh tokens.
//!
//! Mutations are two-phase: all new tokens are sealed first and assigned
//! only once every step has succeeded, so a failed deposit, withdraw or
//! transfer never leaves an account half-updated.

use std::sync::Arc;

use tracing::{info, warn};

use super::ids::AccountNumber;
use super::receipt::Receipt;
use super::transaction::{TransactionKind, TransactionRecord};
use crate::crypto::CipherBox;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::StoredAccount;

/// Number of history entries shown on a receipt
pub const RECEIPT_HISTORY_LEN: usize = 5;

/// Field names used when a core field cannot be recovered
const HOLDER_FIELD: &str = "account_holder";
const BALANCE_FIELD: &str = "balance";

/// A bank account held in encrypted form
#[derive(Debug, Clone)]
pub struct Account {
    account_number: AccountNumber,
    encrypted_holder: String,
    encrypted_balance: String,
    transactions: Vec<String>,
    cipher: Arc<CipherBox>,
}

impl Account {
    /// Create an account, encrypting the holder name and balance immediately
    ///
    /// `transactions` carries existing history tokens over unchanged.
    pub fn new(
        account_number: AccountNumber,
        holder_name: &str,
        balance: f64,
        transactions: Vec<String>,
        cipher: Arc<CipherBox>,
    ) -> LedgerResult<Self> {
        let encrypted_holder = cipher.encrypt(holder_name)?;
        let encrypted_balance = seal_balance_with(&cipher, balance)?;

        Ok(Self {
            account_number,
            encrypted_holder,
            encrypted_balance,
            transactions,
            cipher,
        })
    }

    /// Create a zero-balance account with no history
    pub fn open(
        account_number: AccountNumber,
        holder_name: &str,
        cipher: Arc<CipherBox>,
    ) -> LedgerResult<Self> {
        Self::new(account_number, holder_name, 0.0, Vec::new(), cipher)
    }

    /// Rebuild an account from its persisted tokens
    ///
    /// The holder name and balance are decrypted and re-encrypted, so the
    /// in-memory tokens differ from the ones on disk.
    pub fn from_stored(
        account_number: AccountNumber,
        stored: StoredAccount,
        cipher: Arc<CipherBox>,
    ) -> LedgerResult<Self> {
        let holder_name = cipher
            .decrypt(&stored.account_holder)
            .map_err(|_| critical(&account_number, HOLDER_FIELD))?;
        let balance = cipher
            .decrypt(&stored.balance)
            .map_err(|_| critical(&account_number, BALANCE_FIELD))
            .and_then(|text| parse_balance(&account_number, &text))?;

        Self::new(account_number, &holder_name, balance, stored.transactions, cipher)
    }

    /// Persisted form of this account
    pub fn to_stored(&self) -> StoredAccount {
        StoredAccount {
            account_holder: self.encrypted_holder.clone(),
            balance: self.encrypted_balance.clone(),
            transactions: self.transactions.clone(),
        }
    }

    pub fn account_number(&self) -> &AccountNumber {
        &self.account_number
    }

    /// Decrypted holder name
    pub fn holder_name(&self) -> LedgerResult<String> {
        self.cipher
            .decrypt(&self.encrypted_holder)
            .map_err(|_| critical(&self.account_number, HOLDER_FIELD))
    }

    /// Decrypted balance
    ///
    /// A token that fails to decrypt, or decrypts to something that is not a
    /// finite number, is a [`LedgerError::CriticalDecryption`].
    pub fn balance(&self) -> LedgerResult<f64> {
        let text = self
            .cipher
            .decrypt(&self.encrypted_balance)
            .map_err(|_| critical(&self.account_number, BALANCE_FIELD))?;
        parse_balance(&self.account_number, &text)
    }

    /// Replace the stored balance
    ///
    /// Only finiteness is checked; a balance that could not be read back is
    /// refused with [`LedgerError::Validation`].
    pub fn update_balance(&mut self, new_balance: f64) -> LedgerResult<()> {
        self.encrypted_balance = self.seal_balance(new_balance)?;
        Ok(())
    }

    /// Append an encrypted history entry stamped with the current time
    pub fn add_transaction(&mut self, kind: &TransactionKind, amount: f64) -> LedgerResult<()> {
        let token = self.seal_record(kind, amount)?;
        self.transactions.push(token);
        Ok(())
    }

    /// Add `amount` to the balance and log a deposit; returns the new balance
    pub fn deposit(&mut self, amount: f64) -> LedgerResult<f64> {
        validate_amount(amount)?;

        let new_balance = self.balance()? + amount;
        let balance_token = self.seal_balance(new_balance)?;
        let record_token = self.seal_record(&TransactionKind::Deposit, amount)?;

        self.encrypted_balance = balance_token;
        self.transactions.push(record_token);

        info!(account = %self.account_number, "deposit applied");
        Ok(new_balance)
    }

    /// Take `amount` from the balance and log a withdrawal; returns the new balance
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] and leaves the account
    /// untouched when `amount` exceeds the balance.
    pub fn withdraw(&mut self, amount: f64) -> LedgerResult<f64> {
        validate_amount(amount)?;

        let balance = self.balance()?;
        if amount > balance {
            return Err(self.insufficient(amount, balance));
        }

        let new_balance = balance - amount;
        let balance_token = self.seal_balance(new_balance)?;
        let record_token = self.seal_record(&TransactionKind::Withdraw, amount)?;

        self.encrypted_balance = balance_token;
        self.transactions.push(record_token);

        info!(account = %self.account_number, "withdrawal applied");
        Ok(new_balance)
    }

    /// Move `amount` from this account to `target`; returns this account's new balance
    ///
    /// Both balances are read and all four tokens sealed before either
    /// account changes.
    pub fn transfer(&mut self, target: &mut Account, amount: f64) -> LedgerResult<f64> {
        validate_amount(amount)?;

        if self.account_number == target.account_number {
            return Err(LedgerError::Validation(
                "Cannot transfer to the same account".into(),
            ));
        }

        let source_balance = self.balance()?;
        let target_balance = target.balance()?;

        if amount > source_balance {
            return Err(self.insufficient(amount, source_balance));
        }

        let new_source_balance = source_balance - amount;
        let new_target_balance = target_balance + amount;

        let source_balance_token = self.seal_balance(new_source_balance)?;
        let target_balance_token = target.seal_balance(new_target_balance)?;
        let source_record = self.seal_record(
            &TransactionKind::TransferTo(target.account_number.clone()),
            amount,
        )?;
        let target_record = target.seal_record(
            &TransactionKind::TransferFrom(self.account_number.clone()),
            amount,
        )?;

        self.encrypted_balance = source_balance_token;
        self.transactions.push(source_record);
        target.encrypted_balance = target_balance_token;
        target.transactions.push(target_record);

        info!(
            from = %self.account_number,
            to = %target.account_number,
            "transfer applied"
        );
        Ok(new_source_balance)
    }

    /// Encrypted history tokens in chronological order
    pub fn transaction_tokens(&self) -> &[String] {
        &self.transactions
    }

    /// Number of history entries
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Decrypt the last `count` history entries, oldest first
    ///
    /// Entries that fail to decrypt or parse are skipped with a warning; the
    /// second value is how many were skipped.
    pub fn recent_transactions(&self, count: usize) -> (Vec<TransactionRecord>, usize) {
        let start = self.transactions.len().saturating_sub(count);
        let mut records = Vec::with_capacity(self.transactions.len() - start);
        let mut skipped = 0;

        for token in &self.transactions[start..] {
            let record = self
                .cipher
                .decrypt_opt(token)
                .and_then(|text| TransactionRecord::from_plaintext(&text).ok());

            match record {
                Some(record) => records.push(record),
                None => {
                    warn!(account = %self.account_number, "skipping unreadable transaction");
                    skipped += 1;
                }
            }
        }

        (records, skipped)
    }

    /// Decrypted summary with the most recent history
    pub fn receipt(&self) -> LedgerResult<Receipt> {
        let holder_name = self.holder_name()?;
        let balance = self.balance()?;
        let (recent, skipped) = self.recent_transactions(RECEIPT_HISTORY_LEN);

        Ok(Receipt {
            account_number: self.account_number.clone(),
            holder_name,
            balance,
            recent,
            skipped,
        })
    }

    fn seal_balance(&self, balance: f64) -> LedgerResult<String> {
        seal_balance_with(&self.cipher, balance)
    }

    fn seal_record(&self, kind: &TransactionKind, amount: f64) -> LedgerResult<String> {
        let record = TransactionRecord::new(kind, amount);
        self.cipher.encrypt(&record.to_plaintext()?)
    }

    fn insufficient(&self, needed: f64, available: f64) -> LedgerError {
        LedgerError::InsufficientFunds {
            account: self.account_number.to_string(),
            needed,
            available,
        }
    }
}

/// Reject amounts that are not finite and strictly positive
pub fn validate_amount(amount: f64) -> LedgerResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "Amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(())
}

/// Encrypt a balance, refusing values that would not parse back as finite
fn seal_balance_with(cipher: &CipherBox, balance: f64) -> LedgerResult<String> {
    if !balance.is_finite() {
        return Err(LedgerError::Validation(format!(
            "Resulting balance {} is out of range",
            balance
        )));
    }
    cipher.encrypt(&format_amount(balance))
}

/// Decimal text form of a balance, always with a fractional part ("100.0")
fn format_amount(value: f64) -> String {
    format!("{:?}", value)
}

fn parse_balance(account: &AccountNumber, text: &str) -> LedgerResult<f64> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(critical(account, BALANCE_FIELD)),
    }
}

fn critical(account: &AccountNumber, field: &'static str) -> LedgerError {
    LedgerError::CriticalDecryption {
        account: account.to_string(),
        field,
    }
}
