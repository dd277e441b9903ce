use std::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, ErrorKind},
    path::{Path, PathBuf},
};

use crate::{
    data::{Account, AccountNumber, StoreError, FIRST_ACCOUNT_NUMBER},
    read::read_accounts,
    write::write_accounts,
};

/// File-backed account storage. There is no index: every call reads the whole
/// file, and every mutation rewrites it. Only one process is expected to use a
/// given file at a time; nothing is locked.
#[derive(Debug, Clone)]
pub(crate) struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<Account>, StoreError> {
        log::debug!("Loading accounts from {}...", self.path.display());
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let accounts = read_accounts(BufReader::new(file));
        log::debug!("Loading accounts...done ({} records)", accounts.len());
        Ok(accounts)
    }

    /// Adds one record at the end of the file, creating it if needed.
    pub fn append_one(&self, account: &Account) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write_accounts(BufWriter::new(file), [account])
    }

    /// Replaces the file content with `accounts`. No accounts means no file.
    pub fn save_all(&self, accounts: &[Account]) -> Result<(), StoreError> {
        if accounts.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => {
                    log::info!("Last account gone, removed {}", self.path.display());
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        log::debug!("Saving {} accounts...", accounts.len());
        write_accounts(BufWriter::new(File::create(&self.path)?), accounts)?;
        log::debug!("Saving accounts...done");
        Ok(())
    }

    pub fn find_by_number(&self, number: AccountNumber) -> Result<Option<Account>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|account| account.account_number == number))
    }

    pub fn list_numbers(&self) -> Result<Vec<AccountNumber>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|account| account.account_number)
            .collect())
    }

    /// The number the next created account gets: one past the highest in use.
    /// `None` once `AccountNumber::MAX` is taken.
    pub fn next_account_number(&self) -> Result<Option<AccountNumber>, StoreError> {
        Ok(match self.list_numbers()?.into_iter().max() {
            Some(max) => max.checked_add(1),
            None => Some(FIRST_ACCOUNT_NUMBER),
        })
    }

    /// Overwrites the first record with the same account number and returns
    /// whether there was one. The file is left untouched when there wasn't.
    pub fn update(&self, account: &Account) -> Result<bool, StoreError> {
        let mut accounts = self.load_all()?;
        let Some(slot) = accounts
            .iter_mut()
            .find(|a| a.account_number == account.account_number)
        else {
            return Ok(false);
        };
        *slot = account.clone();
        self.save_all(&accounts)?;
        Ok(true)
    }

    /// Removes every record carrying `number` and returns how many went.
    pub fn delete(&self, number: AccountNumber) -> Result<usize, StoreError> {
        let mut accounts = self.load_all()?;
        let before = accounts.len();
        accounts.retain(|account| account.account_number != number);
        let removed = before - accounts.len();
        if removed > 0 {
            self.save_all(&accounts)?;
        }
        Ok(removed)
    }
}
