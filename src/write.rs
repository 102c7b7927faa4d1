use crate::{
    compute::Accounts,
    data::{Account, TxKind, TIMESTAMP_FORMAT},
};
use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

/// Trait for storing the whole of `Accounts` somewhere after it changed. The
/// service only knows about this; tests plug in an in-memory version.
pub(crate) trait Persist {
    fn persist(&mut self, accounts: &Accounts) -> Result<(), anyhow::Error>;
}

/// The data file, rewritten in full on every save.
#[derive(Debug, Clone)]
pub(crate) struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persist for JsonFile {
    fn persist(&mut self, accounts: &Accounts) -> Result<(), anyhow::Error> {
        save_accounts(&self.path, accounts)
    }
}

/// JSON exporter for `Accounts`
pub(crate) fn write_accounts<W: Write>(
    mut writer: W,
    accounts: &Accounts,
) -> Result<(), anyhow::Error> {
    serde_json::to_writer_pretty(&mut writer, accounts)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Save the whole store to `path`. The document goes to a sibling `.tmp` file first
/// and is renamed over `path` once synced, so a crash mid-write leaves the previous
/// version intact.
pub(crate) fn save_accounts(path: &Path, accounts: &Accounts) -> Result<(), anyhow::Error> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let file =
        std::fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_accounts(&mut writer, accounts)
        .with_context(|| format!("writing {}", tmp.display()))?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
        .with_context(|| format!("syncing {}", tmp.display()))?;
    drop(file);

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("replacing {}", path.display()));
    }
    info!(path = %path.display(), accounts = accounts.len(), "Saved accounts");
    Ok(())
}

/// One line of a statement.
#[derive(Serialize)]
struct StatementRow {
    kind: TxKind,
    amount: Decimal,
    timestamp: String,
}

/// CSV exporter for the full transaction log of one account
pub(crate) fn write_statement<W: Write>(
    writer: W,
    account: &Account,
) -> Result<(), anyhow::Error> {
    // header written by hand so an empty log still gets one
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(["kind", "amount", "timestamp"])?;
    for tx in &account.transactions {
        wtr.serialize(StatementRow {
            kind: tx.kind,
            amount: tx.amount,
            timestamp: tx.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
