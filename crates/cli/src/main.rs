// pullsheet CLI - marketplace pull sheet enrichment

mod checklist;
mod enrich;
mod exit_codes;
mod scryfall;
mod sets;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use exit_codes::{
    EXIT_ENRICH_CONFIG, EXIT_ENRICH_IO, EXIT_ENRICH_PARSE, EXIT_ENRICH_SCHEMA, EXIT_SUCCESS,
};

#[derive(Parser)]
#[command(name = "pullsheet")]
#[command(about = "Enrich marketplace pull sheet exports with Scryfall card data")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the Color column and foil flags on a pull sheet export
    #[command(after_help = "\
Examples:
  pullsheet enrich pull-sheet.csv
  pullsheet enrich pull-sheet.csv -o enriched.csv --checklist mtg_checklist.html
  pullsheet enrich pull-sheet.csv --set-map my_sets.json --throttle-ms 120
  pullsheet enrich pull-sheet.csv --config run.toml --report run_report.json
  pullsheet enrich pull-sheet.csv --max-rows 25 --quiet")]
    Enrich {
        /// Pull sheet CSV exported from the marketplace
        input: PathBuf,

        /// Output CSV path
        #[arg(long, short = 'o', default_value = "tcg_with_colors.csv")]
        output: PathBuf,

        /// Set name to set code mapping JSON (replaces the built-in map)
        #[arg(long, value_name = "FILE", env = "PULLSHEET_SET_MAP")]
        set_map: Option<PathBuf>,

        /// Run configuration TOML (throttle_ms, timeout_secs, max_rows)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Delay between catalog lookups, in milliseconds
        #[arg(long, value_name = "MS")]
        throttle_ms: Option<u64>,

        /// Per-request timeout for catalog lookups, in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Process at most this many eligible rows (0 = no cap)
        #[arg(long, value_name = "N")]
        max_rows: Option<usize>,

        /// Also render the printable checklist to this file
        #[arg(long, value_name = "FILE")]
        checklist: Option<PathBuf>,

        /// Write the run report JSON to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Suppress progress output
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Render a printable checklist from an enriched CSV
    #[command(after_help = "\
Examples:
  pullsheet checklist tcg_with_colors.csv
  pullsheet checklist tcg_with_colors.csv -o pull-list.html")]
    Checklist {
        /// Enriched CSV (output of `pullsheet enrich`)
        input: PathBuf,

        /// Output HTML path
        #[arg(long, short = 'o', default_value = "mtg_checklist.html")]
        output: PathBuf,
    },

    /// Maintain the set name to set code mapping
    Sets {
        #[command(subcommand)]
        command: SetsCommands,
    },
}

#[derive(Subcommand)]
enum SetsCommands {
    /// Rebuild the mapping from the Scryfall set list
    #[command(after_help = "\
Examples:
  pullsheet sets update
  pullsheet sets update --format detailed -o set_info.json
  pullsheet sets update --backup")]
    Update {
        /// Output file path
        #[arg(long, short = 'o', default_value = "set_code_map.json")]
        output: PathBuf,

        /// Output shape
        #[arg(long, value_enum, default_value_t = MapFormat::Simple)]
        format: MapFormat,

        /// Keep a timestamped copy of an existing output file
        #[arg(long)]
        backup: bool,

        /// Suppress progress output
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Merge the Scryfall mapping with a TCGplayer-sourced file
    #[command(after_help = "\
Examples:
  pullsheet sets merge
  pullsheet sets merge --tcgplayer-file tcgplayer_sets.json
  pullsheet sets merge --tcgplayer-file tcgplayer_sets.json --backup")]
    Merge {
        /// TCGplayer set mapping JSON (name to code, or detailed objects)
        #[arg(long, value_name = "FILE")]
        tcgplayer_file: Option<PathBuf>,

        /// Output file path
        #[arg(long, short = 'o', default_value = "set_code_map.json")]
        output: PathBuf,

        /// Keep a timestamped copy of an existing output file
        #[arg(long)]
        backup: bool,

        /// Suppress progress output
        #[arg(long, short = 'q')]
        quiet: bool,
    },
}

/// Shape of the persisted set mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MapFormat {
    /// Flat set name to set code object
    Simple,
    /// One object per set with catalog metadata
    Detailed,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: pullsheet <command> [options]");
            eprintln!("       pullsheet --help for more information");
            Ok(())
        }
        Some(Commands::Enrich {
            input,
            output,
            set_map,
            config,
            throttle_ms,
            timeout_secs,
            max_rows,
            checklist,
            report,
            quiet,
        }) => enrich::cmd_enrich(
            input,
            output,
            set_map,
            config,
            throttle_ms,
            timeout_secs,
            max_rows,
            checklist,
            report,
            quiet,
        ),
        Some(Commands::Checklist { input, output }) => checklist::cmd_checklist(input, output),
        Some(Commands::Sets { command }) => match command {
            SetsCommands::Update {
                output,
                format,
                backup,
                quiet,
            } => sets::cmd_sets_update(output, format, backup, quiet),
            SetsCommands::Merge {
                tcgplayer_file,
                output,
                backup,
                quiet,
            } => sets::cmd_sets_merge(tcgplayer_file, output, backup, quiet),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ENRICH_IO,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ENRICH_PARSE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ENRICH_SCHEMA,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ENRICH_CONFIG,
            message: msg.into(),
            hint: None,
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
