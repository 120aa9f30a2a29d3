//! # feuille-cli
//!
//! Command-line interface for feuille: find an Excel workbook by name and
//! read or write its sheets and cells.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use feuille_locate::Locator;
use feuille_sheet::{CellValue, Sheet, Workbook};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEMO_SOURCE_SHEET: &str = "Feuille1";
const DEMO_TARGET_SHEET: &str = "Feuille2";

/// feuille - locate Excel workbooks and work with their sheets and cells
#[derive(Parser)]
#[command(name = "feuille")]
#[command(author, version, about = "Locate Excel workbooks and read or write their sheets and cells", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory to search instead of the program's own directory
    #[arg(long = "base-dir", value_name = "DIR", global = true)]
    base_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Read a sheet, copy it to another sheet and describe its columns (default)
    Demo(DemoArgs),
    /// List the sheet names of a workbook
    Sheets {
        /// Workbook file name
        file: String,
    },
    /// Print a sheet
    Read {
        /// Workbook file name
        file: String,
        /// Sheet to print (first sheet when omitted)
        #[arg(short, long)]
        sheet: Option<String>,
    },
    /// Describe the type and non-null count of each column
    Describe {
        /// Workbook file name
        file: String,
        /// Sheet to describe (first sheet when omitted)
        #[arg(short, long)]
        sheet: Option<String>,
    },
    /// Print one cell
    Get {
        /// Workbook file name
        file: String,
        /// Sheet name
        sheet: String,
        /// Row number, starting at 1 below the header
        row: usize,
        /// Column name, as written in the header row
        column: String,
    },
    /// Write one cell (rewrites the whole workbook)
    Set {
        /// Workbook file name
        file: String,
        /// Sheet name
        sheet: String,
        /// Row number, starting at 1 below the header
        row: usize,
        /// Column name, as written in the header row
        column: String,
        /// Value; booleans and numbers are detected, anything else is text
        value: String,
    },
}

#[derive(Args)]
struct DemoArgs {
    /// Workbook file name (prompted for when omitted)
    file: Option<String>,

    /// Sheet to read and describe
    #[arg(long, default_value = DEMO_SOURCE_SHEET)]
    source: String,

    /// Sheet the source table is written to
    #[arg(long, default_value = DEMO_TARGET_SHEET)]
    target: String,
}

impl Default for DemoArgs {
    fn default() -> Self {
        DemoArgs {
            file: None,
            source: DEMO_SOURCE_SHEET.to_string(),
            target: DEMO_TARGET_SHEET.to_string(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let locator = match cli.base_dir {
        Some(dir) => Locator::new(dir),
        None => Locator::beside_executable().context("Failed to find the program directory")?,
    };

    run(cli.command.unwrap_or_else(|| Command::Demo(DemoArgs::default())), &locator)
}

/// Execute one command against the workbook it names.
fn run(command: Command, locator: &Locator) -> Result<()> {
    match command {
        Command::Demo(args) => {
            let file = match args.file {
                Some(file) => file,
                None => prompt_file_name()?,
            };
            let Some(workbook) = resolve(locator, &file) else {
                return Ok(());
            };
            println!(
                "{} '{file}': {}",
                "Absolute path to".green(),
                workbook.path().display()
            );
            run_demo(&workbook, &args.source, &args.target)
        }
        Command::Sheets { file } => {
            if let Some(workbook) = resolve(locator, &file) {
                for name in workbook.list_sheet_names()? {
                    println!("{name}");
                }
            }
            Ok(())
        }
        Command::Read { file, sheet } => {
            if let Some(workbook) = resolve(locator, &file) {
                if let Some(sheet) = workbook.read_sheet(sheet.as_deref())? {
                    print!("{}", format_sheet(&sheet));
                }
            }
            Ok(())
        }
        Command::Describe { file, sheet } => {
            if let Some(workbook) = resolve(locator, &file) {
                workbook.describe_columns(sheet.as_deref())?;
            }
            Ok(())
        }
        Command::Get {
            file,
            sheet,
            row,
            column,
        } => {
            if let Some(workbook) = resolve(locator, &file) {
                if let Some(text) = workbook.read_cell(&sheet, row, &column)? {
                    println!("{text}");
                }
            }
            Ok(())
        }
        Command::Set {
            file,
            sheet,
            row,
            column,
            value,
        } => {
            if let Some(workbook) = resolve(locator, &file) {
                workbook.write_cell(&sheet, row, &column, CellValue::parse(&value))?;
            }
            Ok(())
        }
    }
}

/// Read a sheet, write it back under another name, then describe it.
fn run_demo(workbook: &Workbook, source: &str, target: &str) -> Result<()> {
    if let Some(table) = workbook.read_sheet(Some(source))? {
        print!("{}", format_sheet(&table));
        workbook.write_sheet(&table, target)?;
    }
    workbook.describe_columns(Some(source))?;
    Ok(())
}

/// Locate `file`, printing a notice when it cannot be found.
fn resolve(locator: &Locator, file: &str) -> Option<Workbook> {
    match locator.locate(file) {
        Some(path) => {
            tracing::info!("Using workbook {}", path.display());
            Some(Workbook::new(path))
        }
        None => {
            println!(
                "{} '{file}' was not found. Check the name and location of the file.",
                "File".red().bold()
            );
            None
        }
    }
}

/// Ask for a workbook file name on the terminal.
fn prompt_file_name() -> Result<String> {
    let mut rl = DefaultEditor::new()?;
    let prompt = "Excel file name: ".cyan().bold().to_string();

    match rl.readline(&prompt) {
        Ok(line) if !line.trim().is_empty() => Ok(line.trim().to_string()),
        Ok(_) => bail!("No file name given"),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => bail!("No file name given"),
        Err(e) => Err(e.into()),
    }
}

/// Render a sheet as an aligned text table, header underlined.
fn format_sheet(sheet: &Sheet) -> String {
    if sheet.is_empty() {
        return "(empty sheet)\n".to_string();
    }

    let cols = sheet.rows().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; cols];
    for row in sheet.rows() {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.as_str().chars().count());
        }
    }

    let mut out = String::new();
    for (row_idx, row) in sheet.rows().enumerate() {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let text = row.get(i).map(CellValue::as_str).unwrap_or_default();
                format!("{text:<width$}")
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');

        if row_idx == 0 && sheet.column_names().is_some() {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join("  "));
            out.push('\n');
        }
    }
    out
}
