use anyhow::{bail, Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use paintlog::colors::init_terminal_colors_for;
use paintlog::{ColoredFormatter, FormatterConfig, Level, Record, StyleMode};

const CLI_FORMAT: &str = "%(asctime)s %(levelname)-8s %(name)s %(message)s";

#[derive(Parser)]
#[command(name = "paintlog")]
#[command(about = "Color JSON log records by severity using %-style templates")]
#[command(version)]
struct Args {
    /// Input file with one JSON record per line (default: stdin)
    #[arg(value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Format template, e.g. "%(levelname)-8s %(message)s"
    #[arg(short = 'F', long = "format")]
    format: Option<String>,

    /// strftime format for %(asctime)s
    #[arg(short = 'd', long = "datefmt")]
    datefmt: Option<String>,

    /// YAML or JSON file with per-level style rules
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Where styles are applied
    #[arg(long, value_enum)]
    mode: Option<StyleMode>,

    /// Replace <color>, </color>, <b> and </b> tags in the output
    #[arg(long)]
    markup: bool,

    /// Force colored output
    #[arg(long)]
    color: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Print the colored template for LEVEL and exit
    #[arg(long, value_name = "LEVEL")]
    show_template: Option<String>,

    /// Stop at the first record that fails to format
    #[arg(long)]
    fail_fast: bool,

    /// Debug mode - show templates and statistics
    #[arg(long)]
    debug: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,
}

impl Args {
    fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot use both --color and --no-color".to_string());
        }
        Ok(())
    }

    fn color_preference(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color || self.output_file.is_some() {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct Stats {
    lines_processed: usize,
    records_formatted: usize,
    lines_passed_through: usize,
    errors: usize,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // Must happen before any formatter picks up its default colors
    init_terminal_colors_for(args.color_preference(), io::stdout().is_terminal());

    let formatter = build_formatter(&args)?;

    if let Some(level) = &args.show_template {
        let level: Level = level.parse()?;
        println!("{}", formatter.colored_template(level));
        return Ok(());
    }

    let input: Box<dyn BufRead> = if let Some(input_path) = &args.input_file {
        let file = File::open(input_path)
            .with_context(|| format!("Failed to open input file '{}'", input_path.display()))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(io::stdin()))
    };

    let mut output: Box<dyn Write> = if let Some(output_path) = &args.output_file {
        let file = File::create(output_path).with_context(|| {
            format!("Failed to create output file '{}'", output_path.display())
        })?;
        Box::new(io::BufWriter::new(file))
    } else {
        Box::new(io::BufWriter::new(io::stdout()))
    };

    let started = Instant::now();
    let stats = process_stream(&formatter, input, &mut output, &args)?;
    output.flush()?;

    if args.debug {
        eprintln!("Final statistics:");
        eprintln!("  Lines processed: {}", stats.lines_processed);
        eprintln!("  Records formatted: {}", stats.records_formatted);
        eprintln!("  Lines passed through: {}", stats.lines_passed_through);
        eprintln!("  Errors: {}", stats.errors);
        eprintln!("  Processing time: {:?}", started.elapsed());
    }

    Ok(())
}

fn build_formatter(args: &Args) -> Result<ColoredFormatter> {
    let mut config = match &args.config {
        Some(path) => FormatterConfig::from_path(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => FormatterConfig::default(),
    };

    // Command line wins over the config file
    if let Some(format) = &args.format {
        config.format = Some(format.clone());
    } else if config.format.is_none() {
        config.format = Some(CLI_FORMAT.to_string());
    }
    if let Some(datefmt) = &args.datefmt {
        config.datefmt = Some(datefmt.clone());
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    config.markup |= args.markup;

    if args.debug {
        eprintln!("Config: {:?}", config);
    }
    let use_colors = paintlog::colors::colors_enabled();
    Ok(config.build_with(use_colors, args.debug)?)
}

fn process_stream<R: BufRead, W: Write>(
    formatter: &ColoredFormatter,
    input: R,
    output: &mut W,
    args: &Args,
) -> Result<Stats> {
    let mut stats = Stats::default();

    for (line_num, line) in input.lines().enumerate() {
        let line = line?;
        stats.lines_processed += 1;

        let value = match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(value) if value.is_object() => value,
            _ => {
                // Not a record: pass through untouched
                writeln!(output, "{}", line)?;
                stats.lines_passed_through += 1;
                continue;
            }
        };

        let formatted = Record::from_json(&value).and_then(|record| formatter.format(&record));
        match formatted {
            Ok(text) => {
                writeln!(output, "{}", text)?;
                stats.records_formatted += 1;
            }
            Err(e) if args.fail_fast => bail!("Line {}: {}", line_num + 1, e),
            Err(e) => {
                eprintln!("Line {}: {}", line_num + 1, e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}
