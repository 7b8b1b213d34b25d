//! Command-line front end for the account store.
//!
//! # Responsibility
//! - Map each subcommand to exactly one core boundary operation.
//! - Render results as plain text or JSON and keep no state between runs.

use bankfile_core::store::DEFAULT_DATA_FILE;
use bankfile_core::{
    default_log_level, init_logging, Account, AccountNumber, AccountService, AccountUpdate,
    FileAccountRepository, RecordStore, StoreConfig, TransactionService,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bankfile", version, about = "Flat-file bank account store")]
struct Cli {
    /// Data file holding the account records.
    #[arg(long, global = true, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// One of trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print accounts as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open an account and print its number.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        pin: i32,
        #[arg(long, default_value_t = 0.0)]
        deposit: f64,
    },
    /// Add funds to an account.
    Deposit { account: AccountNumber, amount: f64 },
    /// Take funds out of an account.
    Withdraw {
        account: AccountNumber,
        amount: f64,
        #[arg(long)]
        pin: i32,
    },
    /// Move funds between two accounts.
    Transfer {
        source: AccountNumber,
        destination: AccountNumber,
        amount: f64,
        #[arg(long)]
        pin: i32,
    },
    /// Show one account.
    Show { account: AccountNumber },
    /// Show every account.
    List,
    /// Change the holder name.
    UpdateName {
        account: AccountNumber,
        name: String,
        #[arg(long)]
        pin: i32,
    },
    /// Change the pin.
    UpdatePin {
        account: AccountNumber,
        new_pin: i32,
        #[arg(long)]
        pin: i32,
    },
    /// Remove an account.
    Delete {
        account: AccountNumber,
        #[arg(long)]
        pin: i32,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Transfer { .. } => "transfer",
            Self::Show { .. } => "show",
            Self::List => "list",
            Self::UpdateName { .. } => "update_name",
            Self::UpdatePin { .. } => "update_pin",
            Self::Delete { .. } => "delete",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let store = RecordStore::new(StoreConfig::new(&cli.data_file));
    match run(&store, cli.command, cli.json) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(store: &RecordStore, command: Command, json: bool) -> Result<String, Box<dyn Error>> {
    info!("event=cli_command module=cli status=start command={}", command.name());
    let accounts = AccountService::new(FileAccountRepository::new(store));
    let transactions = TransactionService::new(FileAccountRepository::new(store));

    let output = match command {
        Command::Create { name, pin, deposit } => {
            let account = accounts.create_account(&name, pin, deposit)?;
            format!("account created: {}", account.number)
        }
        Command::Deposit { account, amount } => {
            let balance = transactions.deposit(account, amount)?;
            format!("deposit successful, new balance: {balance:.2}")
        }
        Command::Withdraw {
            account,
            amount,
            pin,
        } => {
            let balance = transactions.withdraw(account, pin, amount)?;
            format!("withdrawal successful, new balance: {balance:.2}")
        }
        Command::Transfer {
            source,
            destination,
            amount,
            pin,
        } => {
            let receipt = transactions.transfer(source, pin, destination, amount)?;
            format!(
                "transfer successful, new balance (source): {:.2}",
                receipt.source_balance
            )
        }
        Command::Show { account } => render_account(&accounts.find_account(account)?, json)?,
        Command::List => render_list(&accounts.list_accounts()?, json)?,
        Command::UpdateName { account, name, pin } => {
            accounts.update_account(account, pin, AccountUpdate::Name(name))?;
            format!("account {account} updated")
        }
        Command::UpdatePin {
            account,
            new_pin,
            pin,
        } => {
            accounts.update_account(account, pin, AccountUpdate::Pin(new_pin))?;
            format!("account {account} updated")
        }
        Command::Delete { account, pin } => {
            accounts.delete_account(account, pin)?;
            format!("account {account} deleted")
        }
    };
    Ok(output)
}

fn render_account(account: &Account, json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(account);
    }
    Ok(format!(
        "Account Number : {}\nName           : {}\nBalance        : {:.2}",
        account.number, account.name, account.balance
    ))
}

fn render_list(accounts: &[Account], json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(accounts);
    }
    if accounts.is_empty() {
        return Ok("no accounts found".to_string());
    }
    Ok(accounts
        .iter()
        .map(|account| {
            format!(
                "Account: {} | Name: {} | Balance: {:.2}",
                account.number, account.name, account.balance
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
