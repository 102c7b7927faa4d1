use crate::{
    compute::Accounts,
    data::{Account, AccountNumber, Error, Transaction, PIN_LEN},
    write::Persist,
};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Who is logged in, if anybody. Owned by the front-end and handed to every `Bank`
/// call; there is only ever one of these per process.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    current: Option<AccountNumber>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Back to anonymous. Always succeeds, even when nobody was logged in.
    pub fn logout(&mut self) {
        if let Some(number) = self.current.take() {
            info!(account = %number, "Logged out");
        }
    }

    fn account_number(&self) -> Result<&AccountNumber, Error> {
        self.current.as_ref().ok_or(Error::NotAuthenticated)
    }
}

fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LEN && pin.bytes().all(|b| b.is_ascii_digit())
}

/// The operations layer: validates requests, mutates `Accounts`, and writes the
/// whole store back through `Persist` after every change.
pub(crate) struct Bank<P> {
    accounts: Accounts,
    storage: P,
}

impl<P: Persist> Bank<P> {
    pub fn new(accounts: Accounts, storage: P) -> Self {
        Self { accounts, storage }
    }

    pub fn create_account(
        &mut self,
        name: &str,
        account_number: &str,
        pin: &str,
    ) -> Result<(), Error> {
        if self.accounts.accounts.contains_key(account_number) {
            return Err(Error::DuplicateAccount(account_number.to_owned()));
        }
        if !is_valid_pin(pin) {
            return Err(Error::InvalidPin);
        }
        self.accounts.accounts.insert(
            account_number.to_owned(),
            Account::new(name.to_owned(), account_number.to_owned(), pin.to_owned()),
        );
        if let Err(e) = self.save() {
            self.accounts.accounts.remove(account_number);
            return Err(e);
        }
        info!(account = %account_number, "Account created");
        Ok(())
    }

    /// Check the credentials and make the account the session's current one. On
    /// failure the session is left anonymous.
    pub fn authenticate(
        &self,
        session: &mut Session,
        account_number: &str,
        pin: &str,
    ) -> Result<&Account, Error> {
        session.current = None;
        let account = self
            .accounts
            .accounts
            .get(account_number)
            .ok_or_else(|| Error::AccountNotFound(account_number.to_owned()))?;
        // Plain comparison, no hashing nor throttling.
        if account.pin != pin {
            warn!(account = %account_number, "Wrong PIN");
            return Err(Error::InvalidPin);
        }
        session.current = Some(account.account_number.clone());
        info!(account = %account_number, "Logged in");
        Ok(account)
    }

    /// Name and balance of the logged in account, for status display.
    pub fn current(&self, session: &Session) -> Result<&Account, Error> {
        let number = session.account_number()?;
        self.accounts
            .accounts
            .get(number)
            .ok_or_else(|| Error::AccountNotFound(number.clone()))
    }

    pub fn deposit(&mut self, session: &Session, amount: Decimal) -> Result<Decimal, Error> {
        self.update(session, |account| account.deposit(amount))
    }

    pub fn withdraw(&mut self, session: &Session, amount: Decimal) -> Result<Decimal, Error> {
        self.update(session, |account| account.withdraw(amount))
    }

    /// The most recent transactions of the logged in account, oldest first.
    pub fn history(&self, session: &Session) -> Result<&[Transaction], Error> {
        Ok(self.current(session)?.recent_transactions())
    }

    /// Apply `op` to the current account and save; returns the new balance. If the
    /// save fails the account is put back as it was.
    fn update<F>(&mut self, session: &Session, op: F) -> Result<Decimal, Error>
    where
        F: FnOnce(&mut Account) -> Result<(), Error>,
    {
        let number = session.account_number()?;
        let account = self
            .accounts
            .accounts
            .get_mut(number)
            .ok_or_else(|| Error::AccountNotFound(number.clone()))?;
        let before = account.clone();
        op(account)?;
        let balance = account.balance;
        if let Err(e) = self.save() {
            self.accounts.accounts.insert(number.clone(), before);
            return Err(e);
        }
        debug!(account = %number, %balance, "Balance updated");
        Ok(balance)
    }

    fn save(&mut self) -> Result<(), Error> {
        self.storage.persist(&self.accounts).map_err(|e| {
            warn!("Save failed: {e:#}");
            Error::Storage(format!("{e:#}"))
        })
    }
}
