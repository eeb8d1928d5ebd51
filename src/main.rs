//! mdscope - find CLAUDE.md projects and read their documents from the terminal
//!
//! mdscope provides:
//! - Project discovery over configured folders with depth and name exclusions
//! - Pinning of projects and auxiliary documents
//! - Styled terminal rendering of markdown documents
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
