use crate::compute::Accounts;
use anyhow::Context;
use std::{io::ErrorKind, path::Path};
use tracing::{info, warn};

/// What we found when looking for the data file. Starting from an empty store is fine
/// when there was no file yet, but a corrupt one deserves a warning since whatever it
/// held is going to be overwritten by the next save.
#[derive(Debug)]
pub(crate) enum Loaded {
    Found(Accounts),
    Absent,
    Corrupt(anyhow::Error),
}

impl Loaded {
    /// Collapse the outcome into a usable store, warning on corruption.
    pub fn into_accounts(self, path: &Path) -> Accounts {
        match self {
            Loaded::Found(accounts) => {
                info!(path = %path.display(), accounts = accounts.len(), "Loaded accounts");
                accounts
            }
            Loaded::Absent => {
                info!(path = %path.display(), "No data file yet, starting empty");
                Accounts::new()
            }
            Loaded::Corrupt(e) => {
                warn!(path = %path.display(), "Data file unreadable, starting empty: {e:#}");
                Accounts::new()
            }
        }
    }
}

/// JSON importer for `Accounts`.
pub(crate) fn read_accounts<R: std::io::Read>(reader: R) -> Result<Accounts, anyhow::Error> {
    let accounts = serde_json::from_reader(std::io::BufReader::new(reader))?;
    Ok(accounts)
}

/// Load the whole store from `path`.
pub(crate) fn load_accounts(path: &Path) -> Loaded {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Loaded::Absent,
        Err(e) => {
            return Loaded::Corrupt(
                anyhow::Error::new(e).context(format!("opening {}", path.display())),
            )
        }
    };
    match read_accounts(file).with_context(|| format!("parsing {}", path.display())) {
        Ok(accounts) => Loaded::Found(accounts),
        Err(e) => Loaded::Corrupt(e),
    }
}
