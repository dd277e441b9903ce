use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AccountNumber = u64;
pub type Pin = u16;

/// Number given to the first account of an empty store.
pub const FIRST_ACCOUNT_NUMBER: AccountNumber = 12345678;
pub const BALANCE_DIGITS: u32 = 2;
pub const MAX_PIN: Pin = 9999;

/// One line of the accounts file. Field order matters: the file has no header
/// so records are (de)serialized by position.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Account {
    pub name: String,
    pub address: String,
    pub account_number: AccountNumber,
    pub account_type: String,
    #[serde(serialize_with = "serialize_balance")]
    pub balance: Decimal,
    pub pin: Pin,
}

/// Balances always hit the disk with exactly two digits, whatever scale the
/// in-memory value ended up with.
fn serialize_balance<S>(balance: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&normalize(*balance))
}

/// Rounds an amount to cents and pins its scale, so `50.5` becomes `50.50`.
pub fn normalize(amount: Decimal) -> Decimal {
    let mut amount =
        amount.round_dp_with_strategy(BALANCE_DIGITS, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(BALANCE_DIGITS);
    amount
}

/// Failures of the accounts file itself, as opposed to what's in it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Accounts file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Accounts file encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Everything an operation can be refused for. The `Display` strings are what
/// the shell shows to the user.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),
    #[error("Invalid PIN")]
    InvalidPin,
    #[error("PIN must be at most 4 digits")]
    PinFormat,
    #[error("Insufficient funds (asked {asked} while {available} available)")]
    InsufficientFunds { asked: Decimal, available: Decimal },
    #[error("Amount must not be negative")]
    NegativeAmount,
    #[error("Amount too large to be kept in cents")]
    AmountTooLarge,
    #[error("Cannot transfer to the same account")]
    SameAccount,
    #[error("No account number left to assign")]
    NumbersExhausted,
    #[error(transparent)]
    Store(#[from] StoreError),
}
