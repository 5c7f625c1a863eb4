//! Tallysheet - batch front end for the incrementally recalculated cell store.

mod config_path;

use anyhow::{Context, bail};
use std::env;
use std::path::{Path, PathBuf};
use tallysheet_core::{SheetConfig, SheetRules, Spreadsheet};

fn print_usage() {
    eprintln!("Usage: tallysheet [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Snapshot to open (.xml, or the line format)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <NAME=CONTENTS> Assign a cell (can be repeated)");
    eprintln!("  -o, --output <FILE>       Save the result (.xml, or the line format)");
    eprintln!("  -c, --config <FILE>       Load naming rules and version from TOML");
    eprintln!("  --no-config               Ignore the user config.toml");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Args {
    file_path: Option<PathBuf>,
    assignments: Vec<(String, String)>,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    no_config: bool,
}

/// Parse command-line arguments. `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> anyhow::Result<Option<Args>> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "-s" | "--set" => {
                i += 1;
                let Some(assignment) = args.get(i) else {
                    bail!("--set requires NAME=CONTENTS");
                };
                let Some((name, contents)) = assignment.split_once('=') else {
                    bail!("Expected NAME=CONTENTS, got {:?}", assignment);
                };
                parsed
                    .assignments
                    .push((name.trim().to_string(), contents.to_string()));
            }
            "-o" | "--output" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--output requires a file path");
                };
                parsed.output_file = Some(PathBuf::from(path));
            }
            "-c" | "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--config requires a file path");
                };
                parsed.config_file = Some(PathBuf::from(path));
            }
            "--no-config" => parsed.no_config = true,
            arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
            arg => {
                if parsed.file_path.is_some() {
                    bail!("Unexpected argument: {}", arg);
                }
                parsed.file_path = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(Some(parsed))
}

fn load_rules(args: &Args) -> anyhow::Result<SheetRules> {
    let path = match &args.config_file {
        Some(path) => Some(path.clone()),
        None if args.no_config => None,
        None => config_path::default_config_path().filter(|path| path.is_file()),
    };
    let Some(path) = path else {
        return Ok(SheetRules::default());
    };

    log::debug!("using config {}", path.display());
    let config = SheetConfig::load(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    Ok(config.into_rules()?)
}

fn open_sheet(path: Option<&Path>, rules: SheetRules) -> anyhow::Result<Spreadsheet> {
    match path {
        Some(path) if path.exists() => Spreadsheet::open(path, rules)
            .with_context(|| format!("Failed to open {}", path.display())),
        _ => Ok(Spreadsheet::with_rules(rules)),
    }
}

fn print_cells(sheet: &Spreadsheet) -> anyhow::Result<()> {
    for name in sheet.names_of_nonempty_cells() {
        let contents = sheet.contents_string(&name)?;
        let value = sheet.value(&name)?;
        println!("{}\t{}\t{}", name, contents.escape_debug(), value);
    }
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    let rules = load_rules(&args)?;
    let mut sheet = open_sheet(args.file_path.as_deref(), rules)?;

    for (name, contents) in &args.assignments {
        let order = sheet
            .set_contents(name, contents)
            .with_context(|| format!("Cannot set {} to {:?}", name, contents))?;
        log::debug!("{} -> recalculated {}", name, order.join(", "));
    }

    print_cells(&sheet)?;

    if let Some(output_path) = &args.output_file {
        sheet
            .save(output_path)
            .with_context(|| format!("Failed to save {}", output_path.display()))?;
        eprintln!("Saved to {}", output_path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let argv: Vec<String> = env::args().collect();
    let args = match parse_args(&argv) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
