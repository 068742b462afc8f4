use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use jiff::tz::TimeZone;
use serde_json::json;
use serial_date::{ExpansionLimit, RecurrenceDefinition, SerialDate, MAX_OCCURRENCES};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "serial-date",
    about = "Expand a recurring calendar entry into its occurrences",
    version
)]
struct Cli {
    /// Path to a JSON definition (`-` or absent reads stdin)
    path: Option<PathBuf>,

    /// IANA time zone the epoch milliseconds are read in
    #[arg(long, default_value = "UTC")]
    tz: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Validate the definition without expanding it
    #[arg(long)]
    check: bool,

    /// Print an English description of the definition
    #[arg(long)]
    describe: bool,

    /// Print start and end of every occurrence
    #[arg(long)]
    spans: bool,

    /// Maximum number of generated occurrences
    #[arg(long, default_value_t = MAX_OCCURRENCES)]
    limit: usize,

    /// Log engine decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = match read_input(cli.path.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to read input: {e}");
            process::exit(2);
        }
    };

    let tz = match TimeZone::get(&cli.tz) {
        Ok(tz) => tz,
        Err(e) => {
            eprintln!("error: invalid --tz: {e}");
            process::exit(2);
        }
    };

    let definition = match RecurrenceDefinition::from_json_in(&input, tz) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    debug!(tz = %cli.tz, limit = cli.limit, "definition loaded");

    if cli.check {
        println!("\u{2713} valid");
        process::exit(0);
    }

    if cli.describe {
        println!("{definition}");
        process::exit(0);
    }

    let series = SerialDate::with_limit(definition, ExpansionLimit::new(cli.limit));
    let expansion = match series.expansion() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if expansion.too_many_dates() && !cli.json {
        eprintln!("warning: series truncated at {} occurrences", cli.limit);
    }

    if cli.spans {
        let spans = match series.spans() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        };
        if cli.json {
            let spans: Vec<_> = spans
                .iter()
                .map(|(start, end)| json!({ "start": start.to_string(), "end": end.to_string() }))
                .collect();
            println!(
                "{}",
                json!({ "spans": spans, "toomanydates": expansion.too_many_dates() })
            );
        } else {
            for (start, end) in &spans {
                println!("{start} {end}");
            }
        }
        process::exit(0);
    }

    if cli.json {
        let dates: Vec<String> = expansion.dates().iter().map(|z| z.to_string()).collect();
        println!(
            "{}",
            json!({ "dates": dates, "toomanydates": expansion.too_many_dates() })
        );
        process::exit(0);
    }

    if expansion.is_empty() {
        eprintln!("no occurrences");
        process::exit(0);
    }

    for z in expansion.dates() {
        println!("{z}");
    }
}
