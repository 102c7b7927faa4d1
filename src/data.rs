use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AccountNumber = String;

/// Number of digits a PIN must have.
pub const PIN_LEN: usize = 4;
/// How many of the most recent transactions `history` surfaces.
pub const HISTORY_LEN: usize = 20;
/// Transactions are stamped to the minute.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One account as it lives in memory and on disk. The balance is only ever touched by
/// `deposit`/`withdraw` (see `compute.rs`), which is what keeps it non-negative.
///
/// Note that the PIN is kept and compared in clear text; this is what existing data files
/// contain, so it stays that way, but it's nowhere near proper credential handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Account {
    pub name: String,
    pub account_number: AccountNumber,
    pub pin: String,
    #[serde(with = "amount")]
    pub balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// A single entry of the append-only log. On disk it is a `[kind, amount, timestamp]`
/// triple rather than an object, see `TransactionRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TransactionRecord", try_from = "TransactionRecord")]
pub(crate) struct Transaction {
    pub kind: TxKind,
    pub amount: Decimal,
    pub timestamp: NaiveDateTime,
}

/// Proxy for (de)serializing `Transaction` as a JSON array with a formatted timestamp.
#[derive(Serialize, Deserialize)]
pub(crate) struct TransactionRecord(TxKind, #[serde(with = "amount")] Decimal, String);

/// Amounts are written as bare JSON numbers carrying exactly the digits held in memory,
/// so what was saved is what comes back. Going through `f64` would not be.
pub(crate) mod amount {
    use rust_decimal::Decimal;
    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::value::RawValue;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        RawValue::from_string(amount.to_string())
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        parse(raw.get()).map_err(de::Error::custom)
    }

    /// Plain or scientific notation (`1e3`, older files may hold `1.5e-7`).
    pub fn parse(text: &str) -> Result<Decimal, rust_decimal::Error> {
        Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text))
    }
}

impl From<Transaction> for TransactionRecord {
    fn from(tx: Transaction) -> Self {
        Self(
            tx.kind,
            tx.amount,
            tx.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        )
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = chrono::ParseError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let TransactionRecord(kind, amount, timestamp) = record;
        Ok(Self {
            kind,
            amount,
            timestamp: NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)?,
        })
    }
}

/// Kinds of transaction; the variant names are what gets written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum TxKind {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxKind::Deposit => f.write_str("Deposit"),
            TxKind::Withdraw => f.write_str("Withdraw"),
        }
    }
}

/// Everything an operation can refuse. All of them but `Storage` are plain validation
/// failures the front-end shows to the user before letting them retry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Amount must be positive")]
    InvalidAmount,
    #[error("Amount too large (balance is {balance})")]
    AmountTooLarge { balance: Decimal },
    #[error("Insufficient balance (asked {asked} while {available} available)")]
    InsufficientBalance { asked: Decimal, available: Decimal },
    #[error("Account {0} already exists")]
    DuplicateAccount(AccountNumber),
    #[error("Invalid PIN")]
    InvalidPin,
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),
    #[error("Please login first")]
    NotAuthenticated,
    #[error("Could not save accounts: {0}")]
    Storage(String),
}
