use rust_decimal::Decimal;

use crate::{
    data::{normalize, Account, AccountNumber, Error, Pin, BALANCE_DIGITS, MAX_PIN},
    store::Store,
};

/// What a customer provides to open an account; the rest is filled in by the
/// bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewAccount {
    pub name: String,
    pub address: String,
    pub account_type: String,
    pub pin: Pin,
}

/// This is where the business logic stands. Each operation reloads the store,
/// checks what it has to check, and writes back; nothing is cached between
/// calls so the file is always the source of truth.
#[derive(Debug)]
pub(crate) struct Bank {
    store: Store,
}

impl Bank {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn create(&self, new: NewAccount) -> Result<Account, Error> {
        if new.pin > MAX_PIN {
            return Err(Error::PinFormat);
        }
        let account_number = self
            .store
            .next_account_number()?
            .ok_or(Error::NumbersExhausted)?;
        let account = Account {
            name: new.name,
            address: new.address,
            account_number,
            account_type: new.account_type,
            balance: normalize(Decimal::ZERO),
            pin: new.pin,
        };
        self.store.append_one(&account)?;
        log::info!("Created account {account_number}");
        Ok(account)
    }

    /// Looks an account up without asking for its PIN.
    pub fn inquire(&self, number: AccountNumber) -> Result<Account, Error> {
        self.store
            .find_by_number(number)?
            .ok_or(Error::AccountNotFound(number))
    }

    /// Returns the new balance.
    pub fn deposit(
        &self,
        number: AccountNumber,
        pin: Pin,
        amount: Decimal,
    ) -> Result<Decimal, Error> {
        let amount = checked_amount(amount)?;
        let mut account = self.authorize(number, pin)?;
        credit(&mut account, amount)?;
        self.store.update(&account)?;
        Ok(account.balance)
    }

    /// Returns the new balance.
    pub fn withdraw(
        &self,
        number: AccountNumber,
        pin: Pin,
        amount: Decimal,
    ) -> Result<Decimal, Error> {
        let amount = checked_amount(amount)?;
        let mut account = self.authorize(number, pin)?;
        debit(&mut account, amount)?;
        self.store.update(&account)?;
        Ok(account.balance)
    }

    /// Moves `amount` from `from` to `to` and returns the new balance of `from`.
    ///
    /// The two accounts are written one after the other; if the second write
    /// fails the money has left `from` without reaching `to`.
    pub fn transfer(
        &self,
        from: AccountNumber,
        pin: Pin,
        to: AccountNumber,
        amount: Decimal,
    ) -> Result<Decimal, Error> {
        let amount = checked_amount(amount)?;
        let mut source = self.authorize(from, pin)?;
        debit(&mut source, amount)?;
        if from == to {
            return Err(Error::SameAccount);
        }
        let mut destination = self.inquire(to)?;
        credit(&mut destination, amount)?;

        self.store.update(&source)?;
        self.store.update(&destination)?;
        log::info!("Transferred {amount} from {from} to {to}");
        Ok(source.balance)
    }

    pub fn delete(&self, number: AccountNumber, pin: Pin) -> Result<(), Error> {
        self.authorize(number, pin)?;
        self.store.delete(number)?;
        log::info!("Deleted account {number}");
        Ok(())
    }

    /// The account, if it exists and `pin` opens it.
    fn authorize(&self, number: AccountNumber, pin: Pin) -> Result<Account, Error> {
        let account = self.inquire(number)?;
        if account.pin != pin {
            return Err(Error::InvalidPin);
        }
        Ok(account)
    }
}

/// Non-negative and representable in cents. Past about 7.9e26 a `Decimal`
/// has no room left for two fractional digits.
fn checked_amount(amount: Decimal) -> Result<Decimal, Error> {
    if amount.is_sign_negative() {
        return Err(Error::NegativeAmount);
    }
    let amount = normalize(amount);
    if amount.scale() != BALANCE_DIGITS {
        return Err(Error::AmountTooLarge);
    }
    Ok(amount)
}

fn credit(account: &mut Account, amount: Decimal) -> Result<(), Error> {
    account.balance = account
        .balance
        .checked_add(amount)
        .filter(|balance| balance.scale() == BALANCE_DIGITS)
        .ok_or(Error::AmountTooLarge)?;
    Ok(())
}

fn debit(account: &mut Account, amount: Decimal) -> Result<(), Error> {
    if account.balance < amount {
        return Err(Error::InsufficientFunds {
            asked: amount,
            available: account.balance,
        });
    }
    account.balance -= amount;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Bank, NewAccount};
    use crate::{data::Error, store::Store};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn bank_with(content: Option<&str>) -> (TempDir, Bank, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.dat");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        let bank = Bank::new(Store::new(&path));
        (dir, bank, path)
    }

    fn scenario() -> (TempDir, Bank, std::path::PathBuf) {
        bank_with(Some("Account1,Here,12345678,current,0,1111\n"))
    }

    fn new_account(name: &str) -> NewAccount {
        NewAccount {
            name: name.into(),
            address: "Here".into(),
            account_type: "current".into(),
            pin: 1234,
        }
    }

    #[test]
    fn create_in_empty_store() {
        let (_dir, bank, path) = bank_with(None);
        let account = bank.create(new_account("Alice")).unwrap();
        assert_eq!(account.account_number, 12345678);
        assert_eq!(account.balance, dec!(0));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "Alice,Here,12345678,current,0.00,1234\n"
        );
    }

    #[test]
    fn create_after_existing() {
        let (_dir, bank, _path) = bank_with(Some(
            "A,Here,12345678,current,0,1111\nB,Here,12345679,current,0,2222\n",
        ));
        let account = bank.create(new_account("C")).unwrap();
        assert_eq!(account.account_number, 12345680);
        assert_eq!(bank.inquire(12345680).unwrap().name, "C");
    }

    #[test]
    fn create_rejects_long_pin() {
        let (_dir, bank, path) = bank_with(None);
        let mut new = new_account("Alice");
        new.pin = 12345;
        assert!(matches!(bank.create(new), Err(Error::PinFormat)));
        assert!(!path.exists());
    }

    #[test]
    fn inquire() {
        let (_dir, bank, _path) = scenario();
        let account = bank.inquire(12345678).unwrap();
        assert_eq!(account.name, "Account1");
        assert_eq!(account.address, "Here");
        assert_eq!(account.account_type, "current");
        assert_eq!(account.balance.to_string(), "0.00");
        assert!(matches!(
            bank.inquire(1),
            Err(Error::AccountNotFound(1))
        ));
    }

    #[test]
    fn deposit_withdraw_transfer_scenario() {
        let (_dir, bank, path) = scenario();

        let balance = bank.deposit(12345678, 1111, dec!(50.5)).unwrap();
        assert_eq!(balance.to_string(), "50.50");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Account1,Here,12345678,current,50.50,1111\n"
        );

        assert!(matches!(
            bank.withdraw(12345678, 1111, dec!(100)),
            Err(Error::InsufficientFunds { .. })
        ));
        assert_eq!(bank.inquire(12345678).unwrap().balance, dec!(50.50));

        assert!(matches!(
            bank.transfer(12345678, 1111, 99999999, dec!(50)),
            Err(Error::AccountNotFound(99999999))
        ));
        assert_eq!(bank.inquire(12345678).unwrap().balance, dec!(50.50));
    }

    #[test]
    fn deposits_and_withdrawals_add_up() {
        let (_dir, bank, _path) = scenario();
        bank.deposit(12345678, 1111, dec!(100)).unwrap();
        bank.withdraw(12345678, 1111, dec!(30.25)).unwrap();
        bank.deposit(12345678, 1111, dec!(0.75)).unwrap();
        let balance = bank.withdraw(12345678, 1111, dec!(70.5)).unwrap();
        assert_eq!(balance, dec!(0));
        assert_eq!(bank.inquire(12345678).unwrap().balance, dec!(0));
    }

    #[test]
    fn withdraw_whole_balance() {
        let (_dir, bank, _path) = scenario();
        bank.deposit(12345678, 1111, dec!(10)).unwrap();
        assert_eq!(bank.withdraw(12345678, 1111, dec!(10)).unwrap(), dec!(0));
    }

    #[test]
    fn wrong_pin() {
        let (_dir, bank, path) = scenario();
        let before = std::fs::read_to_string(&path).unwrap();
        assert!(matches!(
            bank.deposit(12345678, 2222, dec!(10)),
            Err(Error::InvalidPin)
        ));
        assert!(matches!(
            bank.withdraw(12345678, 2222, dec!(0)),
            Err(Error::InvalidPin)
        ));
        assert!(matches!(
            bank.transfer(12345678, 2222, 12345678, dec!(0)),
            Err(Error::InvalidPin)
        ));
        assert!(matches!(bank.delete(12345678, 2222), Err(Error::InvalidPin)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn unknown_account_leaves_file_alone() {
        let (_dir, bank, path) = scenario();
        let before = std::fs::read_to_string(&path).unwrap();
        assert!(matches!(
            bank.deposit(1, 1111, dec!(10)),
            Err(Error::AccountNotFound(1))
        ));
        assert!(matches!(
            bank.withdraw(1, 1111, dec!(10)),
            Err(Error::AccountNotFound(1))
        ));
        assert!(matches!(
            bank.transfer(1, 1111, 12345678, dec!(10)),
            Err(Error::AccountNotFound(1))
        ));
        assert!(matches!(bank.delete(1, 1111), Err(Error::AccountNotFound(1))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn negative_amounts() {
        let (_dir, bank, _path) = scenario();
        assert!(matches!(
            bank.deposit(12345678, 1111, dec!(-10)),
            Err(Error::NegativeAmount)
        ));
        assert!(matches!(
            bank.withdraw(12345678, 1111, dec!(-10)),
            Err(Error::NegativeAmount)
        ));
        assert!(matches!(
            bank.transfer(12345678, 1111, 12345678, dec!(-10)),
            Err(Error::NegativeAmount)
        ));
        assert_eq!(bank.inquire(12345678).unwrap().balance, dec!(0));
    }

    #[test]
    fn transfer() {
        let (_dir, bank, _path) = scenario();
        let other = bank.create(new_account("Account2")).unwrap();
        bank.deposit(12345678, 1111, dec!(100)).unwrap();

        let balance = bank
            .transfer(12345678, 1111, other.account_number, dec!(40.1))
            .unwrap();
        assert_eq!(balance, dec!(59.90));
        assert_eq!(
            bank.inquire(other.account_number).unwrap().balance,
            dec!(40.10)
        );

        assert!(matches!(
            bank.transfer(12345678, 1111, other.account_number, dec!(60)),
            Err(Error::InsufficientFunds { .. })
        ));
        assert_eq!(
            bank.inquire(other.account_number).unwrap().balance,
            dec!(40.10)
        );
    }

    #[test]
    fn transfer_to_self() {
        let (_dir, bank, _path) = scenario();
        bank.deposit(12345678, 1111, dec!(10)).unwrap();
        assert!(matches!(
            bank.transfer(12345678, 1111, 12345678, dec!(5)),
            Err(Error::SameAccount)
        ));
        assert_eq!(bank.inquire(12345678).unwrap().balance, dec!(10));
    }

    #[test]
    fn delete() {
        let (_dir, bank, path) = scenario();
        let other = bank.create(new_account("Account2")).unwrap();
        bank.delete(12345678, 1111).unwrap();
        assert!(matches!(
            bank.inquire(12345678),
            Err(Error::AccountNotFound(12345678))
        ));
        bank.delete(other.account_number, 1234).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn amounts_beyond_cents_are_refused() {
        let (_dir, bank, path) = scenario();
        let before = std::fs::read_to_string(&path).unwrap();
        assert!(matches!(
            bank.deposit(12345678, 1111, Decimal::MAX),
            Err(Error::AmountTooLarge)
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn balance_overflow_is_refused() {
        let (_dir, bank, path) = scenario();
        let other = bank.create(new_account("Account2")).unwrap();
        bank.deposit(other.account_number, 1234, dec!(1)).unwrap();

        let largest = Decimal::from_i128_with_scale(79_228_162_514_264_337_593_543_950_335, 2);
        let balance = bank.deposit(12345678, 1111, largest).unwrap();
        assert_eq!(balance, largest);
        let before = std::fs::read_to_string(&path).unwrap();
        assert!(before.contains(",792281625142643375935439503.35,"));

        assert!(matches!(
            bank.deposit(12345678, 1111, dec!(0.01)),
            Err(Error::AmountTooLarge)
        ));
        assert!(matches!(
            bank.transfer(other.account_number, 1234, 12345678, dec!(1)),
            Err(Error::AmountTooLarge)
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(bank.inquire(other.account_number).unwrap().balance, dec!(1));
    }
}
