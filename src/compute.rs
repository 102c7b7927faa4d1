use crate::data::{Account, AccountNumber, Error, Transaction, TxKind, HISTORY_LEN};
use chrono::{Local, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// This is where accounts are stored, keyed by account number. A `BTreeMap` keeps the
/// saved file in a stable order. Single user, single thread: no protections for MT.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Accounts {
    pub accounts: BTreeMap<AccountNumber, Account>,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}

/// Wall-clock time, cut down to the minute since that's all we keep.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

impl Account {
    pub fn new(name: String, account_number: AccountNumber, pin: String) -> Self {
        Self {
            name,
            account_number,
            pin,
            balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), Error> {
        self.deposit_at(amount, now())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), Error> {
        self.withdraw_at(amount, now())
    }

    fn deposit_at(&mut self, amount: Decimal, timestamp: NaiveDateTime) -> Result<(), Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(Error::AmountTooLarge {
                balance: self.balance,
            })?;
        self.transactions.push(Transaction {
            kind: TxKind::Deposit,
            amount,
            timestamp,
        });
        Ok(())
    }

    fn withdraw_at(&mut self, amount: Decimal, timestamp: NaiveDateTime) -> Result<(), Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        if amount > self.balance {
            return Err(Error::InsufficientBalance {
                asked: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.transactions.push(Transaction {
            kind: TxKind::Withdraw,
            amount,
            timestamp,
        });
        Ok(())
    }

    /// The tail of the log that gets displayed, oldest first. The full log stays on disk.
    pub fn recent_transactions(&self) -> &[Transaction] {
        let start = self.transactions.len().saturating_sub(HISTORY_LEN);
        &self.transactions[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::now;
    use crate::data::{Account, Error, TxKind::*, HISTORY_LEN};
    use chrono::{NaiveDate, Timelike};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn asha() -> Account {
        Account::new("Asha".into(), "A001".into(), "1234".into())
    }

    #[test]
    fn test_deposit() {
        let mut account = asha();
        account.deposit(dec!(500)).unwrap();
        assert_eq!(account.balance, dec!(500));
        assert_eq!(account.transactions.len(), 1);
        assert_eq!(account.transactions[0].kind, Deposit);
        assert_eq!(account.transactions[0].amount, dec!(500));
    }

    #[test]
    fn test_withdraw() {
        let mut account = asha();
        account.deposit(dec!(500)).unwrap();
        account.withdraw(dec!(200)).unwrap();
        assert_eq!(account.balance, dec!(300));
        assert_eq!(
            account
                .transactions
                .iter()
                .map(|tx| (tx.kind, tx.amount))
                .collect::<Vec<_>>(),
            [(Deposit, dec!(500)), (Withdraw, dec!(200))]
        );
    }

    #[test]
    fn test_withdraw_whole_balance() {
        let mut account = asha();
        account.deposit(dec!(0.30)).unwrap();
        account.withdraw(dec!(0.1)).unwrap();
        account.withdraw(dec!(0.2)).unwrap();
        assert_eq!(account.balance, dec!(0));
    }

    #[test]
    fn test_insufficient_balance() {
        let mut account = asha();
        account.deposit(dec!(100)).unwrap();
        let before = account.clone();
        assert_eq!(
            account.withdraw(dec!(100.01)),
            Err(Error::InsufficientBalance {
                asked: dec!(100.01),
                available: dec!(100)
            })
        );
        assert_eq!(account, before);
    }

    #[test]
    fn test_invalid_amount() {
        let mut account = asha();
        account.deposit(dec!(10)).unwrap();
        let before = account.clone();
        assert_eq!(account.withdraw(dec!(0)), Err(Error::InvalidAmount));
        assert_eq!(account.deposit(dec!(-5)), Err(Error::InvalidAmount));
        assert_eq!(account.deposit(dec!(0)), Err(Error::InvalidAmount));
        assert_eq!(account.withdraw(dec!(-5)), Err(Error::InvalidAmount));
        assert_eq!(account, before);
    }

    #[test]
    fn test_deposit_overflow() {
        let mut account = asha();
        account.deposit(Decimal::MAX).unwrap();
        let before = account.clone();
        assert_eq!(
            account.deposit(Decimal::MAX),
            Err(Error::AmountTooLarge {
                balance: Decimal::MAX
            })
        );
        assert!(account.deposit(dec!(1)).is_err());
        assert_eq!(account, before);
        assert_eq!(account.transactions.len(), 1);
        account.withdraw(Decimal::MAX).unwrap();
        assert_eq!(account.balance, dec!(0));
    }

    #[test]
    fn test_recent_transactions() {
        let mut account = asha();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        for i in 1..=25 {
            let at = start + chrono::Duration::minutes(i);
            account.deposit_at(i.into(), at).unwrap();
        }
        let recent = account.recent_transactions();
        assert_eq!(recent.len(), HISTORY_LEN);
        assert_eq!(recent.first().unwrap().amount, dec!(6));
        assert_eq!(recent.last().unwrap().amount, dec!(25));
        assert!(recent.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(account.transactions.len(), 25);
    }

    #[test]
    fn test_short_history() {
        let mut account = asha();
        assert!(account.recent_transactions().is_empty());
        account.deposit(dec!(1)).unwrap();
        assert_eq!(account.recent_transactions().len(), 1);
    }

    #[test]
    fn test_timestamp_precision() {
        let stamp = now();
        assert_eq!(stamp.second(), 0);
        assert_eq!(stamp.nanosecond(), 0);
    }
}
