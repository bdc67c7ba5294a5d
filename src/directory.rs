use clap::Subcommand;
use daily_bill::billing::{BillingSession, FileSnapshot, JsonFileStore};
use daily_bill::config::AppConfig;
use daily_bill::error::AppError;
use daily_bill::telemetry::{self, LogSink};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand, Debug)]
pub(crate) enum DirectoryCommand {
    /// Merge a CSV file into the directory (imported rows win on card number)
    Import {
        /// CSV file with Name,CardNo,Designation[,DefaultTaka] rows
        path: PathBuf,
        /// Settings key
        #[arg(long)]
        key: String,
    },
    /// Write the directory as CSV to a file or stdout
    Export {
        /// Destination file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
        /// Settings key
        #[arg(long)]
        key: String,
    },
    /// Delete every saved employee profile
    Clear {
        /// Settings key
        #[arg(long)]
        key: String,
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },
    /// List directory matches for a name or card number fragment
    Suggest {
        query: String,
    },
}

pub(crate) fn run_directory(command: DirectoryCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let store = Arc::new(JsonFileStore::new(&config.billing.data_dir));
    let snapshot = FileSnapshot::new(&config.billing.snapshot_path);
    let mut session = BillingSession::bootstrap(store, &snapshot, config.billing.settings_key);

    match command {
        DirectoryCommand::Import { path, key } => {
            unlock(&mut session, &key)?;
            let bytes = std::fs::read(&path)?;
            let total = session.import_directory(&bytes)?;
            println!("Database updated! Total profiles: {total}");
        }
        DirectoryCommand::Export { output, key } => {
            unlock(&mut session, &key)?;
            let csv = session.export_directory()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    info!(path = %path.display(), "directory exported");
                }
                None => print!("{csv}"),
            }
        }
        DirectoryCommand::Clear { key, yes } => {
            unlock(&mut session, &key)?;
            let confirmed = yes || confirm_clear(session.directory().len())?;
            if !confirmed {
                println!("Aborted; directory unchanged.");
                return Ok(());
            }
            session.clear_directory(true)?;
            println!("Database cleared successfully.");
        }
        DirectoryCommand::Suggest { query } => {
            let suggestions = session.suggestions(&query);
            if suggestions.is_empty() {
                println!("No matches for '{query}'");
            }
            for employee in suggestions {
                println!(
                    "{} | {} | {}",
                    employee.card_no, employee.name, employee.designation
                );
            }
        }
    }

    Ok(())
}

fn unlock(session: &mut BillingSession<JsonFileStore>, key: &str) -> Result<(), AppError> {
    if session.unlock(key) {
        Ok(())
    } else {
        Err(AppError::Billing(daily_bill::billing::BillingError::Locked))
    }
}

fn confirm_clear(records: usize) -> Result<bool, AppError> {
    print!(
        "Delete all {records} saved employee profiles? This cannot be undone. Type 'yes' to confirm: "
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
