use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use phonescan::{
    BatchEvent, BatchState, Error, PhoneValidator, SourceFormat, StagedUpload, ValidatorConfig,
    sources,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Find and validate phone numbers in text, CSV, spreadsheets and documents.
#[derive(Debug, Parser)]
#[command(name = "phonescan", version, about)]
struct Cli {
    /// TOML config file. PHONESCAN_* environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Region assumed for numbers without a leading +<country code>.
    #[arg(long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a single number and print the verdict as JSON.
    Validate { number: String },
    /// Extract and validate every number in a file, streaming NDJSON events.
    Bulk {
        /// Input file, or `-` for stdin.
        file: PathBuf,
        /// Input format. Detected from the extension when omitted.
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        pause_ms: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Csv,
    Spreadsheet,
    Pdf,
    Docx,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => SourceFormat::PlainText,
            FormatArg::Csv => SourceFormat::Delimited,
            FormatArg::Spreadsheet => SourceFormat::Spreadsheet,
            FormatArg::Pdf => SourceFormat::Pdf,
            FormatArg::Docx => SourceFormat::Docx,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Error> {
    let mut config = match &cli.config {
        Some(path) => ValidatorConfig::load(path)?,
        None => ValidatorConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(region) = cli.region {
        config.default_region = Some(region);
    }

    match cli.command {
        Command::Validate { number } => {
            let validator = PhoneValidator::new(&config)?;
            let result = validator.validate_single(&number)?;
            print_json(&result)?;
            Ok(if result.valid { ExitCode::SUCCESS } else { ExitCode::from(2) })
        }
        Command::Bulk { file, format, chunk_size, pause_ms } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            if let Some(pause_ms) = pause_ms {
                config.chunk_pause_ms = pause_ms;
            }
            let validator = PhoneValidator::new(&config)?;
            bulk(&validator, file, format.map(SourceFormat::from)).await
        }
    }
}

async fn bulk(
    validator: &PhoneValidator,
    file: PathBuf,
    format: Option<SourceFormat>,
) -> Result<ExitCode, Error> {
    let (events, receiver) = validator.event_channel();
    let cancel = CancellationToken::new();

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling batch");
            ctrl_c.cancel();
        }
    });
    let printer = tokio::spawn(print_events(receiver));

    let report = if file.as_os_str() == "-" {
        // Stdin has no name to sniff, so the staged copy is named after the
        // requested format. Plain text unless told otherwise.
        let name = match format {
            Some(SourceFormat::Delimited) => "stdin.csv",
            Some(SourceFormat::Spreadsheet) => "stdin.xlsx",
            Some(SourceFormat::Pdf) => "stdin.pdf",
            Some(SourceFormat::Docx) => "stdin.docx",
            Some(SourceFormat::PlainText) | None => "stdin.txt",
        };
        let upload = StagedUpload::stage(io::stdin().lock(), name)?;
        validator.validate_upload(upload, events, cancel).await?
    } else {
        let format = match format {
            Some(format) => format,
            None => SourceFormat::from_path(&file)?,
        };
        let source = sources::open(&file, format)?;
        validator.validate_bulk(source, events, cancel).await
    };

    printer
        .await
        .map_err(|err| Error::Io(io::Error::other(err)))??;

    info!(
        "Batch {:?}: {} of {} processed",
        report.state, report.progress.processed_count, report.progress.total_count
    );
    Ok(match report.state {
        BatchState::Completed => ExitCode::SUCCESS,
        BatchState::Cancelled => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    })
}

/// Writes every event as one JSON line on stdout until the sender is gone.
async fn print_events(mut receiver: mpsc::Receiver<BatchEvent>) -> io::Result<()> {
    while let Some(event) = receiver.recv().await {
        let line = event.to_json_line().map_err(io::Error::other)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(line.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Error> {
    let line = serde_json::to_string(value).map_err(io::Error::other)?;
    println!("{line}");
    Ok(())
}
