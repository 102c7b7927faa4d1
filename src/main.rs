use bank::Bank;
use read::load_accounts;
use tracing_subscriber::EnvFilter;
use write::JsonFile;

mod bank;
mod compute;
mod data;
mod read;
mod shell;
mod write;

const DEFAULT_DATA_FILE: &str = "bank_data.json";

/// Logs go to stderr so they never get mixed with the menu on stdout.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), anyhow::Error> {
    init_logging();
    let args: Vec<String> = std::env::args().collect();
    let storage = match args.len() {
        1 => JsonFile::new(DEFAULT_DATA_FILE),
        2 => JsonFile::new(&args[1]),
        _ => anyhow::bail!("usage: {} [bank_data.json]", args[0]),
    };
    let accounts = load_accounts(storage.path()).into_accounts(storage.path());
    let mut bank = Bank::new(accounts, storage);
    shell::run(&mut bank, std::io::stdin().lock(), std::io::stdout())
}
