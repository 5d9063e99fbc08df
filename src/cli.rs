use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the lines matching a query
    Filter {
        /// e.g. `測定 (掃除 OR -メンテナンス)`
        #[clap(allow_hyphen_values = true)]
        query: String,

        /// Files to read; stdin when empty
        files: Vec<PathBuf>,

        /// Report malformed queries instead of falling back to substring search
        #[clap(long, conflicts_with = "lenient")]
        strict: bool,

        /// Fall back to substring search when the query is malformed
        #[clap(long)]
        lenient: bool,

        /// Print the count only
        #[clap(short = 'c', long, default_value = "false")]
        count: bool,

        /// Prefix each line with its line number
        #[clap(short = 'n', long, default_value = "false")]
        line_number: bool,
    },
    /// Show the tokens and the compiled tree of a query
    Explain {
        #[clap(allow_hyphen_values = true)]
        query: String,
    },
    /// Print the normalized form of a text
    Normalize {
        #[clap(allow_hyphen_values = true)]
        text: String,
    },
}
