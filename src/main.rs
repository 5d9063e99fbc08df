use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{anyhow, Context};
use bq::config::{Config, MatchMode};
use bq::search_query::{normalize, SearchQuery};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod handlers;

use handlers::FilterOptions;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Filter {
            query,
            files,
            strict,
            lenient,
            count,
            line_number,
        } => {
            let mut config = Config::load()?;
            if strict {
                config.mode = MatchMode::Strict;
            } else if lenient {
                config.mode = MatchMode::Lenient;
            }

            let search = SearchQuery::from_config(&query, &config)
                .map_err(|e| anyhow!(handlers::render_error(&query, &e)))?;
            let opts = FilterOptions { count, line_number };

            let stdout = io::stdout();
            let mut out = stdout.lock();
            let found = if files.is_empty() {
                handlers::filter_lines(&search, io::stdin().lock(), &mut out, opts)?
            } else {
                let mut total = 0;
                for path in &files {
                    let file = File::open(path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    total += handlers::filter_lines(&search, BufReader::new(file), &mut out, opts)?;
                }
                total
            };

            log::info!("query={query:?} matched={found}");
            Ok(())
        }

        cli::Command::Explain { query } => {
            handlers::explain(&query, &mut io::stdout().lock())?;
            Ok(())
        }

        cli::Command::Normalize { text } => {
            println!("{}", normalize(&text));
            Ok(())
        }
    }
}
