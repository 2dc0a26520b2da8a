//! Ledger service
//!
//! Owns the account collection, the data file and the cipher box. The ledger
//! is the only writer of the data file. Mutations happen in memory; callers
//! invoke [`Ledger::save`] to persist them (account creation saves on its
//! own).

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::LedgerPaths;
use crate::crypto::{load_or_create_key, CipherBox};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountNumber, Receipt};
use crate::storage::{LedgerDocument, LedgerFile};

/// Outcome of [`Ledger::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No data file yet; the ledger starts empty
    Missing,
    /// The data file was read successfully
    Loaded { accounts: usize },
    /// The data file could not be parsed; the ledger starts empty and the
    /// file is left as it is until the next save
    Corrupt,
}

/// The collection of all accounts plus their persistence
#[derive(Debug)]
pub struct Ledger {
    file: LedgerFile,
    cipher: Arc<CipherBox>,
    accounts: BTreeMap<AccountNumber, Account>,
}

impl Ledger {
    /// Create an empty ledger, loading or creating the key file
    ///
    /// Does not read the data file; call [`Ledger::load`] for that.
    pub fn new(paths: LedgerPaths) -> LedgerResult<Self> {
        let key = load_or_create_key(paths.key_file())?;
        let cipher = Arc::new(CipherBox::new(&key)?);

        Ok(Self {
            file: LedgerFile::new(paths.data_file()),
            cipher,
            accounts: BTreeMap::new(),
        })
    }

    /// Create a ledger and load its data file
    pub fn open(paths: LedgerPaths) -> LedgerResult<Self> {
        let mut ledger = Self::new(paths)?;
        ledger.load()?;
        Ok(ledger)
    }

    /// Replace the in-memory accounts with the contents of the data file
    ///
    /// A holder name or balance that cannot be decrypted aborts the load with
    /// [`LedgerError::CriticalDecryption`] and keeps the previous in-memory
    /// state, so a later save cannot overwrite data that might still be
    /// recovered with the right key.
    pub fn load(&mut self) -> LedgerResult<LoadStatus> {
        let document = match self.file.load() {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!(path = %self.file.path().display(), "no data file, starting empty");
                self.accounts.clear();
                return Ok(LoadStatus::Missing);
            }
            Err(LedgerError::CorruptStore(reason)) => {
                warn!(%reason, "data file is corrupt, starting with an empty ledger");
                self.accounts.clear();
                return Ok(LoadStatus::Corrupt);
            }
            Err(err) => return Err(err),
        };

        let mut accounts = BTreeMap::new();
        for (number, stored) in document.accounts {
            if !AccountNumber::is_well_formed(&number) {
                warn!(account = %number, "account number in data file is not 8 digits");
            }
            let number = AccountNumber::from_stored(number);
            let account = Account::from_stored(number.clone(), stored, Arc::clone(&self.cipher))?;
            accounts.insert(number, account);
        }

        let count = accounts.len();
        self.accounts = accounts;
        info!(accounts = count, "ledger loaded");
        Ok(LoadStatus::Loaded { accounts: count })
    }

    /// Write every account to the data file, replacing its contents
    pub fn save(&self) -> LedgerResult<()> {
        let document = LedgerDocument {
            accounts: self
                .accounts
                .iter()
                .map(|(number, account)| (number.to_string(), account.to_stored()))
                .collect(),
        };

        self.file.save(&document)?;
        debug!(accounts = self.accounts.len(), "ledger saved");
        Ok(())
    }

    /// Open a new zero-balance account and persist the ledger
    ///
    /// Returns the generated account number.
    pub fn create_account(&mut self, holder_name: &str) -> LedgerResult<AccountNumber> {
        let holder_name = holder_name.trim();
        if holder_name.is_empty() {
            return Err(LedgerError::Validation(
                "Account holder name cannot be empty".into(),
            ));
        }

        let number = self.unused_account_number(&mut rand::thread_rng());
        let account = Account::open(number.clone(), holder_name, Arc::clone(&self.cipher))?;
        self.accounts.insert(number.clone(), account);

        if let Err(err) = self.save() {
            self.accounts.remove(&number);
            return Err(err);
        }

        info!(account = %number, "account created");
        Ok(number)
    }

    /// Draw account numbers until one is not already taken
    fn unused_account_number<R: Rng + ?Sized>(&self, rng: &mut R) -> AccountNumber {
        loop {
            let candidate = AccountNumber::generate_with(rng);
            if !self.accounts.contains_key(&candidate) {
                return candidate;
            }
            debug!("account number collision, drawing again");
        }
    }

    /// Exact lookup by account number
    pub fn find_account(&self, account_number: &str) -> Option<&Account> {
        self.accounts.get(account_number)
    }

    /// Deposit into an account; returns the new balance
    pub fn deposit(&mut self, account_number: &str, amount: f64) -> LedgerResult<f64> {
        self.require_mut(account_number)?.deposit(amount)
    }

    /// Withdraw from an account; returns the new balance
    pub fn withdraw(&mut self, account_number: &str, amount: f64) -> LedgerResult<f64> {
        self.require_mut(account_number)?.withdraw(amount)
    }

    /// Transfer between two accounts; returns the source's new balance
    pub fn transfer(&mut self, from: &str, to: &str, amount: f64) -> LedgerResult<f64> {
        if from == to {
            return Err(LedgerError::Validation(
                "Cannot transfer to the same account".into(),
            ));
        }
        if !self.accounts.contains_key(to) {
            return Err(LedgerError::account_not_found(to));
        }

        let (number, mut source) = self
            .accounts
            .remove_entry(from)
            .ok_or_else(|| LedgerError::account_not_found(from))?;

        let result = match self.accounts.get_mut(to) {
            Some(target) => source.transfer(target, amount),
            None => Err(LedgerError::account_not_found(to)),
        };

        self.accounts.insert(number, source);
        result
    }

    /// Receipt for an account
    pub fn receipt(&self, account_number: &str) -> LedgerResult<Receipt> {
        self.find_account(account_number)
            .ok_or_else(|| LedgerError::account_not_found(account_number))?
            .receipt()
    }

    /// All accounts ordered by account number
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn require_mut(&mut self, account_number: &str) -> LedgerResult<&mut Account> {
        self.accounts
            .get_mut(account_number)
            .ok_or_else(|| LedgerError::account_not_found(account_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use crate::storage::StoredAccount;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_ledger() -> (TempDir, Ledger) {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Ledger::open(LedgerPaths::with_base_dir(temp_dir.path())).unwrap();
        (temp_dir, ledger)
    }

    fn reopen(temp_dir: &TempDir) -> Ledger {
        Ledger::open(LedgerPaths::with_base_dir(temp_dir.path())).unwrap()
    }

    #[test]
    fn test_empty_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut ledger = Ledger::new(LedgerPaths::with_base_dir(temp_dir.path())).unwrap();

        assert_eq!(ledger.load().unwrap(), LoadStatus::Missing);
        assert!(ledger.is_empty());
        assert!(temp_dir.path().join("secret.key").exists());
    }

    #[test]
    fn test_create_account_starts_at_zero_and_persists() {
        let (temp_dir, mut ledger) = create_test_ledger();

        let number = ledger.create_account("Alice").unwrap();

        assert!(AccountNumber::is_well_formed(number.as_str()));
        let account = ledger.find_account(number.as_str()).unwrap();
        assert_eq!(account.holder_name().unwrap(), "Alice");
        assert_eq!(account.balance().unwrap(), 0.0);
        assert!(temp_dir.path().join("bank_data.json").exists());
        assert_eq!(reopen(&temp_dir).len(), 1);
    }

    #[test]
    fn test_create_account_trims_and_rejects_blank_names() {
        let (_temp_dir, mut ledger) = create_test_ledger();

        let number = ledger.create_account("  Bob  ").unwrap();
        assert_eq!(
            ledger.find_account(number.as_str()).unwrap().holder_name().unwrap(),
            "Bob"
        );

        assert!(ledger.create_account("   ").unwrap_err().is_validation());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_account_numbers_are_unique() {
        let (_temp_dir, mut ledger) = create_test_ledger();

        let mut seen = HashSet::new();
        for i in 0..50 {
            let number = ledger.create_account(&format!("Holder {}", i)).unwrap();
            assert!(seen.insert(number));
        }
        assert_eq!(ledger.len(), 50);
    }

    #[test]
    fn test_unused_account_number_skips_taken_numbers() {
        let (_temp_dir, mut ledger) = create_test_ledger();

        // Occupy the first three numbers this seed will produce
        let mut probe = StdRng::seed_from_u64(99);
        let taken: Vec<AccountNumber> =
            (0..3).map(|_| AccountNumber::generate_with(&mut probe)).collect();
        for number in &taken {
            let account =
                Account::open(number.clone(), "Taken", Arc::clone(&ledger.cipher)).unwrap();
            ledger.accounts.insert(number.clone(), account);
        }
        let fourth = AccountNumber::generate_with(&mut probe);

        let chosen = ledger.unused_account_number(&mut StdRng::seed_from_u64(99));

        assert!(!taken.contains(&chosen));
        assert_eq!(chosen, fourth);
    }

    #[test]
    fn test_find_account_is_exact() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let number = ledger.create_account("Alice").unwrap();

        assert!(ledger.find_account(number.as_str()).is_some());
        assert!(ledger.find_account(&number.as_str()[..7]).is_none());
        assert!(ledger.find_account("00000000").is_none());
    }

    #[test]
    fn test_scenario_deposit() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();

        assert_eq!(ledger.deposit(alice.as_str(), 100.0).unwrap(), 100.0);

        let account = ledger.find_account(alice.as_str()).unwrap();
        assert_eq!(account.balance().unwrap(), 100.0);
        let (history, _) = account.recent_transactions(10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind(), TransactionKind::Deposit);
        assert_eq!(history[0].amount, 100.0);
    }

    #[test]
    fn test_scenario_withdraw_insufficient() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();
        ledger.deposit(alice.as_str(), 100.0).unwrap();

        let err = ledger.withdraw(alice.as_str(), 150.0).unwrap_err();

        assert!(err.is_insufficient_funds());
        let account = ledger.find_account(alice.as_str()).unwrap();
        assert_eq!(account.balance().unwrap(), 100.0);
        assert_eq!(account.transaction_count(), 1);
    }

    #[test]
    fn test_scenario_transfer() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();
        let bob = ledger.create_account("Bob").unwrap();
        ledger.deposit(alice.as_str(), 100.0).unwrap();

        assert_eq!(ledger.transfer(alice.as_str(), bob.as_str(), 40.0).unwrap(), 60.0);

        let alice_account = ledger.find_account(alice.as_str()).unwrap();
        let bob_account = ledger.find_account(bob.as_str()).unwrap();
        assert_eq!(alice_account.balance().unwrap(), 60.0);
        assert_eq!(bob_account.balance().unwrap(), 40.0);

        let (alice_history, _) = alice_account.recent_transactions(10);
        let (bob_history, _) = bob_account.recent_transactions(10);
        assert_eq!(
            alice_history.last().unwrap().kind(),
            TransactionKind::TransferTo(bob.clone())
        );
        assert_eq!(
            bob_history.last().unwrap().kind(),
            TransactionKind::TransferFrom(alice.clone())
        );
    }

    #[test]
    fn test_transfer_errors_leave_both_accounts_in_place() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();
        let bob = ledger.create_account("Bob").unwrap();
        ledger.deposit(alice.as_str(), 10.0).unwrap();

        assert!(ledger
            .transfer(alice.as_str(), bob.as_str(), 50.0)
            .unwrap_err()
            .is_insufficient_funds());
        assert!(ledger
            .transfer(alice.as_str(), "99999999", 1.0)
            .unwrap_err()
            .is_not_found());
        assert!(ledger
            .transfer("99999999", bob.as_str(), 1.0)
            .unwrap_err()
            .is_not_found());
        assert!(ledger
            .transfer(alice.as_str(), alice.as_str(), 1.0)
            .unwrap_err()
            .is_validation());

        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger.find_account(alice.as_str()).unwrap().balance().unwrap(),
            10.0
        );
        assert_eq!(ledger.find_account(bob.as_str()).unwrap().balance().unwrap(), 0.0);
    }

    #[test]
    fn test_overflowing_deposit_keeps_ledger_loadable() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();

        ledger.deposit(alice.as_str(), 1e308).unwrap();
        assert!(ledger.deposit(alice.as_str(), 1e308).unwrap_err().is_validation());
        ledger.save().unwrap();

        let reloaded = reopen(&temp_dir);
        let account = reloaded.find_account(alice.as_str()).unwrap();
        assert_eq!(account.balance().unwrap(), 1e308);
        assert_eq!(account.transaction_count(), 1);
    }

    #[test]
    fn test_missing_account_operations() {
        let (_temp_dir, mut ledger) = create_test_ledger();

        assert!(ledger.deposit("12345678", 1.0).unwrap_err().is_not_found());
        assert!(ledger.withdraw("12345678", 1.0).unwrap_err().is_not_found());
        assert!(ledger.receipt("12345678").unwrap_err().is_not_found());
    }

    #[test]
    fn test_save_and_reload_preserves_decrypted_state() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();
        let bob = ledger.create_account("Bob").unwrap();
        ledger.deposit(alice.as_str(), 100.0).unwrap();
        ledger.withdraw(alice.as_str(), 25.5).unwrap();
        ledger.transfer(alice.as_str(), bob.as_str(), 14.5).unwrap();
        ledger.save().unwrap();

        let reloaded = reopen(&temp_dir);

        assert_eq!(reloaded.len(), 2);
        for original in ledger.accounts() {
            let restored = reloaded
                .find_account(original.account_number().as_str())
                .unwrap();
            assert_eq!(restored.holder_name().unwrap(), original.holder_name().unwrap());
            assert_eq!(restored.balance().unwrap(), original.balance().unwrap());
            assert_eq!(restored.transaction_count(), original.transaction_count());
        }
    }

    #[test]
    fn test_unsaved_mutations_are_not_persisted() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();
        ledger.deposit(alice.as_str(), 100.0).unwrap();

        let reloaded = reopen(&temp_dir);
        let account = reloaded.find_account(alice.as_str()).unwrap();
        assert_eq!(account.balance().unwrap(), 0.0);
    }

    #[test]
    fn test_data_file_holds_no_plaintext() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice Wonderland").unwrap();
        ledger.deposit(alice.as_str(), 1234.5).unwrap();
        ledger.save().unwrap();

        let contents = fs::read_to_string(temp_dir.path().join("bank_data.json")).unwrap();
        assert!(contents.contains(alice.as_str()));
        assert!(!contents.contains("Alice"));
        assert!(!contents.contains("1234.5"));
        assert!(!contents.contains("Deposit"));
    }

    #[test]
    fn test_scenario_corrupt_store() {
        let temp_dir = TempDir::new().unwrap();
        let data_file = temp_dir.path().join("bank_data.json");
        fs::write(&data_file, "{ this is not json").unwrap();

        let mut ledger = Ledger::new(LedgerPaths::with_base_dir(temp_dir.path())).unwrap();
        assert_eq!(ledger.load().unwrap(), LoadStatus::Corrupt);
        assert!(ledger.is_empty());
        assert_eq!(fs::read_to_string(&data_file).unwrap(), "{ this is not json");
    }

    #[test]
    fn test_load_with_wrong_key_is_critical_and_keeps_file() {
        let (temp_dir, mut ledger) = create_test_ledger();
        ledger.create_account("Alice").unwrap();
        let data_file = temp_dir.path().join("bank_data.json");
        let before = fs::read_to_string(&data_file).unwrap();

        // Replace the key so no stored token can be opened
        fs::remove_file(temp_dir.path().join("secret.key")).unwrap();
        let mut fresh = Ledger::new(LedgerPaths::with_base_dir(temp_dir.path())).unwrap();

        let err = fresh.load().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::CriticalDecryption { field: "account_holder", .. }
        ));
        assert!(fresh.is_empty());
        assert_eq!(fs::read_to_string(&data_file).unwrap(), before);
    }

    #[test]
    fn test_load_keeps_unreadable_transactions_for_later() {
        let (temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();
        ledger.deposit(alice.as_str(), 5.0).unwrap();
        ledger.save().unwrap();

        // Append a tampered history token directly in the file
        let data_file = LedgerFile::new(temp_dir.path().join("bank_data.json"));
        let mut document = data_file.load().unwrap().unwrap();
        let entry: &mut StoredAccount = document.accounts.get_mut(alice.as_str()).unwrap();
        entry.transactions.push("tampered".into());
        data_file.save(&document).unwrap();

        let reloaded = reopen(&temp_dir);
        let account = reloaded.find_account(alice.as_str()).unwrap();
        assert_eq!(account.transaction_count(), 2);

        let receipt = reloaded.receipt(alice.as_str()).unwrap();
        assert_eq!(receipt.recent.len(), 1);
        assert_eq!(receipt.skipped, 1);
    }

    #[test]
    fn test_scenario_receipt_last_five() {
        let (_temp_dir, mut ledger) = create_test_ledger();
        let alice = ledger.create_account("Alice").unwrap();
        for amount in 1..=7 {
            ledger.deposit(alice.as_str(), amount as f64 * 10.0).unwrap();
        }

        let receipt = ledger.receipt(alice.as_str()).unwrap();

        let amounts: Vec<f64> = receipt.recent.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![30.0, 40.0, 50.0, 60.0, 70.0]);
    }
}
