use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
    str::FromStr,
};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    bank::{Bank, NewAccount},
    data::{self, AccountNumber, Pin},
};

const MENU: &str = "\
Please choose an option:
1. Create Account
2. Get Account Details
3. Deposit Funds
4. Withdraw Funds
5. Transfer Funds
6. Delete Account
7. Exit";

/// Menu entries, numbered as printed.
#[derive(Debug, Clone, Copy)]
enum Action {
    Create,
    Inquire,
    Deposit,
    Withdraw,
    Transfer,
    Delete,
    Exit,
}

impl TryFrom<u32> for Action {
    type Error = u32;

    fn try_from(choice: u32) -> Result<Self, Self::Error> {
        Ok(match choice {
            1 => Action::Create,
            2 => Action::Inquire,
            3 => Action::Deposit,
            4 => Action::Withdraw,
            5 => Action::Transfer,
            6 => Action::Delete,
            7 => Action::Exit,
            other => return Err(other),
        })
    }
}

enum LoopControl {
    Continue,
    Exit,
}

/// Why an action stopped before completing.
#[derive(Error, Debug)]
enum Abort {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown option {0}")]
    UnknownOption(u32),
    #[error("End of input")]
    EndOfInput,
    #[error(transparent)]
    Console(#[from] io::Error),
    #[error(transparent)]
    Refused(#[from] data::Error),
}

/// Whitespace separated tokens, read a line at a time.
struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }

    /// Drops what's left of the current line.
    fn discard_line(&mut self) {
        self.pending.clear();
    }
}

/// Interactive front end: prompts for each field, hands typed values to the
/// `Bank` and prints what came out of it.
pub(crate) struct Shell<R, W> {
    bank: Bank,
    input: Tokens<R>,
    out: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(bank: Bank, input: R, out: W) -> Self {
        Self {
            bank,
            input: Tokens::new(input),
            out,
        }
    }

    /// Runs the menu until "Exit" or the end of the input. Only console
    /// failures are returned; refused operations are printed and the menu
    /// comes back.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "Welcome to the bank!")?;
        writeln!(self.out, "How can we help you today?")?;
        loop {
            writeln!(self.out, "{MENU}")?;
            let step = match self.ask::<u32>("Enter your choice: ") {
                Ok(choice) => self.dispatch(choice),
                Err(e) => Err(e),
            };
            match step {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Exit) => return Ok(()),
                Err(e) => {
                    if !self.report(e)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Prints an aborted action and drops the rest of its input line, so
    /// leftovers are never taken as a menu choice. `Ok(false)` means there's
    /// no input left.
    fn report(&mut self, abort: Abort) -> io::Result<bool> {
        match abort {
            Abort::EndOfInput => Ok(false),
            Abort::Console(e) => Err(e),
            e => {
                log::warn!("{e}");
                self.input.discard_line();
                writeln!(self.out, "{e}")?;
                Ok(true)
            }
        }
    }

    fn dispatch(&mut self, choice: u32) -> Result<LoopControl, Abort> {
        match Action::try_from(choice).map_err(Abort::UnknownOption)? {
            Action::Create => self.create()?,
            Action::Inquire => self.inquire()?,
            Action::Deposit => self.deposit()?,
            Action::Withdraw => self.withdraw()?,
            Action::Transfer => self.transfer()?,
            Action::Delete => self.delete()?,
            Action::Exit => {
                writeln!(self.out, "Goodbye!")?;
                return Ok(LoopControl::Exit);
            }
        }
        Ok(LoopControl::Continue)
    }

    fn ask<T: FromStr>(&mut self, prompt: &str) -> Result<T, Abort> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let token = self.input.next_token()?.ok_or(Abort::EndOfInput)?;
        token.parse().map_err(|_| Abort::InvalidInput(token))
    }

    fn ask_credentials(&mut self) -> Result<(AccountNumber, Pin), Abort> {
        let number = self.ask("Enter your account number: ")?;
        let pin = self.ask("Enter your PIN: ")?;
        Ok((number, pin))
    }

    fn print_balance(&mut self, balance: Decimal) -> Result<(), Abort> {
        writeln!(self.out, "Thank you, your new balance is: {balance}")?;
        Ok(())
    }

    fn create(&mut self) -> Result<(), Abort> {
        let new = NewAccount {
            name: self.ask("Enter your name: ")?,
            address: self.ask("Enter your address: ")?,
            account_type: self.ask("Enter your account type: ")?,
            pin: self.ask("Enter your PIN: ")?,
        };
        let account = self.bank.create(new)?;
        writeln!(
            self.out,
            "Your account number is: {}",
            account.account_number
        )?;
        Ok(())
    }

    fn inquire(&mut self) -> Result<(), Abort> {
        let number = self.ask("Enter your account number: ")?;
        let account = self.bank.inquire(number)?;
        writeln!(self.out, "Name: {}", account.name)?;
        writeln!(self.out, "Address: {}", account.address)?;
        writeln!(self.out, "Account number: {}", account.account_number)?;
        writeln!(self.out, "Account type: {}", account.account_type)?;
        writeln!(self.out, "Balance: {}", account.balance)?;
        Ok(())
    }

    fn deposit(&mut self) -> Result<(), Abort> {
        let (number, pin) = self.ask_credentials()?;
        let amount = self.ask("Enter the amount you wish to deposit: ")?;
        let balance = self.bank.deposit(number, pin, amount)?;
        self.print_balance(balance)
    }

    fn withdraw(&mut self) -> Result<(), Abort> {
        let (number, pin) = self.ask_credentials()?;
        let amount = self.ask("Enter the amount you wish to withdraw: ")?;
        let balance = self.bank.withdraw(number, pin, amount)?;
        self.print_balance(balance)
    }

    fn transfer(&mut self) -> Result<(), Abort> {
        let (number, pin) = self.ask_credentials()?;
        let to = self.ask("Enter the account number you wish to transfer to: ")?;
        let amount = self.ask("Enter the amount you wish to transfer: ")?;
        let balance = self.bank.transfer(number, pin, to, amount)?;
        self.print_balance(balance)
    }

    fn delete(&mut self) -> Result<(), Abort> {
        let (number, pin) = self.ask_credentials()?;
        self.bank.delete(number, pin)?;
        writeln!(self.out, "Account deleted")?;
        Ok(())
    }
}
