use std::path::PathBuf;

use clap::Parser;

/// Manage bank accounts kept in a flat file, through an interactive menu
#[derive(Parser, Debug)]
pub struct Args {
    /// Path to the accounts file; created on first account, removed with the last
    #[clap(short, long, default_value = "accounts.dat")]
    pub file: PathBuf,
}

pub fn parse() -> Args {
    Args::parse()
}
