use bgp_prefix_summary::bgp::read_table_prefixes;
use bgp_prefix_summary::output::{write_aggregates, PrefixStore};
use bgp_prefix_summary::processing::{LogTrace, NullTrace, TraceSink};
use bgp_prefix_summary::{aggregate_with, parse_prefixes, parse_prefixes_lenient, Prefix};
use clap::Parser;
use colored::Colorize;
use itertools::Itertools;
use log::LevelFilter;
use std::error::Error;
use std::path::PathBuf;

mod cli;

use cli::Cli;

fn main() {
    // Do as little as possible in main.rs as it can't contain any tests
    let cli = Cli::parse();
    init_logging(cli.trace);
    dotenv::dotenv().ok();
    //
    log::info!("#Start main()");

    if let Err(e) = run(&cli) {
        log::error!("{} {e}", "failed".on_red());
        std::process::exit(1);
    }

    log::info!("#End main()");
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let raw = read_table_prefixes(&cli.table, &cli.origin_as)?;

    let prefixes: Vec<Prefix> = if cli.skip_invalid {
        let (parsed, skipped) = parse_prefixes_lenient(&raw);
        if !skipped.is_empty() {
            log::warn!(
                "{skipped_tag} {n} malformed prefixes: {entries}",
                skipped_tag = "skipped".on_yellow(),
                n = skipped.len(),
                entries = skipped.iter().map(|s| s.input.as_str()).join(", ")
            );
        }
        parsed
    } else {
        parse_prefixes(&raw)?
    };
    let read_count = prefixes.len();

    let trace: &dyn TraceSink = if cli.trace { &LogTrace } else { &NullTrace };
    let aggregates = aggregate_with(prefixes, cli.max_length, cli.truncate, trace)?;

    let database = cli.database.clone().or_else(database_from_env);
    let written = match &database {
        Some(db_path) => {
            // The store needs its own pass, so buffer the sequence once.
            let aggregates: Vec<Prefix> = aggregates.collect();
            let written = write_aggregates(&cli.output, aggregates.iter().copied())?;
            let mut store = PrefixStore::open(db_path)?;
            store.clear()?;
            store.insert_all(aggregates, &cli.origin_as)?;
            written
        }
        None => write_aggregates(&cli.output, aggregates)?,
    };

    println!(
        "{done} AS{origin_as}: {read_count} prefixes -> {written} aggregates in {output}",
        done = "Done".on_green(),
        origin_as = cli.origin_as,
        output = cli.output.display()
    );
    Ok(())
}

fn database_from_env() -> Option<PathBuf> {
    std::env::var("SUMMARY_DB").ok().map(PathBuf::from)
}

/// Initialize log4rs from `log4rs.yml`; without the file, or with `--trace`,
/// fall back to a console config built here.
fn init_logging(trace: bool) {
    if trace {
        init_console_logging(LevelFilter::Debug);
    } else if log4rs::init_file("log4rs.yml", Default::default()).is_err() {
        init_console_logging(LevelFilter::Info);
    }
}

fn init_console_logging(level: LevelFilter) {
    use log4rs::append::console::{ConsoleAppender, Target};
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S)} {h({l:<5})} {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .expect("Error building logging config");
    log4rs::init_config(config).expect("Error initializing log4rs");
}
