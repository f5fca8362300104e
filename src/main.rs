use clap::Parser;
use clap::error::ErrorKind;
use generate_images::{config, output, process};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

const USAGE: &str = "Usage: generate-images <input-file|input-folder> <output-folder> [prefix]";

#[derive(Parser)]
#[command(name = "generate-images")]
#[command(version)]
#[command(about = "Generate responsive JPEG, WebP and AVIF variants of product images")]
#[command(long_about = "\
Generate responsive JPEG, WebP and AVIF variants of product images

Every source is rendered at each configured size (stock: desktop 1120x640,
tablet 420x300, mobile 360x260, each also at 2x) in three formats:

  out/<name>-<width>x<height>.jpg    quality 85
  out/<name>-<width>x<height>.webp   quality 80
  out/<name>-<width>x<height>.avif   quality 45, best effort

Naming:
  file input    prefix replaces the file name   (dog.jpg + shop → shop-…)
  folder input  prefix is prepended             (dog.jpg + shop → shop-dog-…)

Folders are scanned (not recursively) for .jpg, .jpeg and .png files.

Run 'generate-images --gen-config' to print a documented config file.")]
struct Cli {
    /// Source image, or a folder of images
    input: Option<PathBuf>,

    /// Folder for the generated variants (created if missing)
    output: Option<PathBuf>,

    /// Output name prefix
    prefix: Option<String>,

    /// TOML file overriding sizes, qualities and crop positions
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a stock config file with all options documented
    #[arg(long)]
    gen_config: bool,

    /// Write a JSON report of every attempted artifact
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only report errors on stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_logging(cli.verbose, cli.quiet);

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    let (Some(input), Some(output_dir)) = (cli.input.as_deref(), cli.output.as_deref()) else {
        eprintln!("{USAGE}");
        return ExitCode::from(1);
    };

    match run(
        input,
        output_dir,
        cli.prefix.as_deref(),
        cli.config.as_deref(),
        cli.report.as_deref(),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(
    input: &Path,
    output_dir: &Path,
    prefix: Option<&str>,
    config_path: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(input, output_dir, prefix, &config, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let report = result?;

    output::print_summary(&report);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)?;
    }
    Ok(())
}

/// Diagnostics go to stderr; stdout carries the progress trace.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
