use crate::demo::{run_demo, DemoArgs};
use crate::directory::{run_directory, DirectoryCommand};
use crate::server;
use clap::{Args, Parser, Subcommand};
use daily_bill::billing::{rate_for_label, NightRate, RateSettings};
use daily_bill::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Daily Bill Generator",
    about = "Compose daily bills, manage the employee directory, and serve the billing API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the amount for a bill category and rank
    Rate(RateArgs),
    /// Import, export, clear, or search the employee directory
    Directory {
        #[command(subcommand)]
        command: DirectoryCommand,
    },
    /// Compose a sample bill end to end and print the document
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct RateArgs {
    /// Bill category (tiffin, daily-labour, holiday, night-entertainment)
    #[arg(long)]
    category: String,
    /// Rank of the employee
    #[arg(long, default_value = "S/O")]
    rank: String,
    /// Night entertainment rate for non-labour ranks (350 or 250)
    #[arg(long, default_value = "350", value_parser = parse_night_rate)]
    night_rate: NightRate,
}

pub(crate) fn parse_night_rate(raw: &str) -> Result<NightRate, String> {
    let amount = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("failed to parse '{raw}' as an amount ({err})"))?;
    NightRate::try_from(amount)
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rate(args) => {
            run_rate(args);
            Ok(())
        }
        Command::Directory { command } => run_directory(command),
        Command::Demo(args) => run_demo(args),
    }
}

fn run_rate(args: RateArgs) {
    let settings = RateSettings {
        night_rate: args.night_rate,
        ..RateSettings::default()
    };
    let amount = rate_for_label(&args.category, &args.rank, &settings);
    println!("{amount}");
}
