use crate::{
    bank::{Bank, Session},
    data::{amount, Error, TxKind, TIMESTAMP_FORMAT},
    write::{write_statement, Persist},
};
use anyhow::Context;
use std::io::{BufRead, Write};

const MENU: &str = "\
1) Create account
2) Login
3) Deposit
4) Withdraw
5) Transaction history
6) Export statement
7) Logout
0) Quit";

/// Minimal line-oriented front-end: it only collects input, calls `Bank` and prints
/// the outcome. Domain errors are shown and the menu comes back; only I/O errors on
/// the terminal itself end the loop.
struct Shell<'a, P, R, W> {
    bank: &'a mut Bank<P>,
    session: Session,
    input: R,
    output: W,
}

pub(crate) fn run<P, R, W>(bank: &mut Bank<P>, input: R, output: W) -> Result<(), anyhow::Error>
where
    P: Persist,
    R: BufRead,
    W: Write,
{
    Shell {
        bank,
        session: Session::new(),
        input,
        output,
    }
    .run()
}

impl<P: Persist, R: BufRead, W: Write> Shell<'_, P, R, W> {
    fn run(&mut self) -> Result<(), anyhow::Error> {
        loop {
            self.status()?;
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };
            match choice.as_str() {
                "1" => self.create_account()?,
                "2" => self.login()?,
                "3" => self.transaction(TxKind::Deposit)?,
                "4" => self.transaction(TxKind::Withdraw)?,
                "5" => self.history()?,
                "6" => self.statement()?,
                "7" => {
                    self.session.logout();
                    writeln!(self.output, "You have been logged out")?;
                }
                "0" | "q" | "quit" => break,
                "" => {}
                other => writeln!(self.output, "Unknown choice {other:?}")?,
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>, anyhow::Error> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line).context("reading input")? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn status(&mut self) -> Result<(), anyhow::Error> {
        match self.bank.current(&self.session) {
            Ok(account) => writeln!(
                self.output,
                "\nWelcome, {} | Balance: {:.2}",
                account.name, account.balance
            )?,
            Err(_) => writeln!(self.output, "\nPlease login")?,
        }
        Ok(())
    }

    fn report(&mut self, error: Error) -> Result<(), anyhow::Error> {
        writeln!(self.output, "Error: {error}")?;
        Ok(())
    }

    fn create_account(&mut self) -> Result<(), anyhow::Error> {
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(());
        };
        let Some(number) = self.prompt("Account number: ")? else {
            return Ok(());
        };
        let Some(pin) = self.prompt("PIN (4 digits): ")? else {
            return Ok(());
        };
        match self.bank.create_account(&name, &number, &pin) {
            Ok(()) => writeln!(self.output, "Account created!")?,
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    fn login(&mut self) -> Result<(), anyhow::Error> {
        let Some(number) = self.prompt("Account number: ")? else {
            return Ok(());
        };
        let Some(pin) = self.prompt("PIN: ")? else {
            return Ok(());
        };
        let result = self
            .bank
            .authenticate(&mut self.session, &number, &pin)
            .map(|_| ());
        if let Err(e) = result {
            self.report(e)?;
        }
        Ok(())
    }

    fn transaction(&mut self, kind: TxKind) -> Result<(), anyhow::Error> {
        if !self.session.is_authenticated() {
            return self.report(Error::NotAuthenticated);
        }
        let Some(input) = self.prompt("Enter amount: ")? else {
            return Ok(());
        };
        if input.is_empty() {
            return Ok(());
        }
        let Ok(amount) = amount::parse(&input) else {
            writeln!(self.output, "Error: {input:?} is not an amount")?;
            return Ok(());
        };
        let result = match kind {
            TxKind::Deposit => self.bank.deposit(&self.session, amount),
            TxKind::Withdraw => self.bank.withdraw(&self.session, amount),
        };
        match result {
            Ok(balance) => writeln!(
                self.output,
                "{kind} successful! New balance: {balance:.2}"
            )?,
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    fn history(&mut self) -> Result<(), anyhow::Error> {
        if !self.session.is_authenticated() {
            return self.report(Error::NotAuthenticated);
        }
        let name = &self.bank.current(&self.session)?.name;
        writeln!(self.output, "Transaction History for {name}")?;
        for tx in self.bank.history(&self.session)? {
            let sign = match tx.kind {
                TxKind::Deposit => '+',
                TxKind::Withdraw => '-',
            };
            writeln!(
                self.output,
                "{} {sign} {}: {:.2}",
                tx.timestamp.format(TIMESTAMP_FORMAT),
                tx.kind,
                tx.amount
            )?;
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<(), anyhow::Error> {
        if !self.session.is_authenticated() {
            return self.report(Error::NotAuthenticated);
        }
        let Some(path) = self.prompt("Statement file: ")? else {
            return Ok(());
        };
        if path.is_empty() {
            return Ok(());
        }
        let account = self.bank.current(&self.session)?;
        let written = std::fs::File::create(&path)
            .map_err(anyhow::Error::from)
            .and_then(|file| write_statement(file, account))
            .with_context(|| format!("exporting statement to {path}"));
        match written {
            Ok(()) => writeln!(self.output, "Statement written to {path}")?,
            Err(e) => writeln!(self.output, "Error: {e:#}")?,
        }
        Ok(())
    }
}
