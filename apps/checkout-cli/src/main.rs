//! # tally-checkout
//!
//! Prices a cart with the configured discount rules and prints the report.
//!
//! ## Usage
//! ```bash
//! # Demo cart and rules
//! cargo run -p checkout-cli
//!
//! # Your own files, items grouped by discount note
//! cargo run -p checkout-cli -- --products cart.json --rules rules.toml --sort-by-note
//!
//! # Engine debug logs (stderr)
//! RUST_LOG=tally=trace cargo run -p checkout-cli
//! ```

use std::process::ExitCode;

use checkout_cli::config::{parse_args, AppConfig, Command, USAGE};
use checkout_cli::error::CliResult;
use tracing::error;

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Checkout failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn try_main() -> CliResult<()> {
    let flags = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            print!("{USAGE}");
            return Ok(());
        }
        Command::Run(flags) => flags,
    };

    checkout_cli::init_tracing();

    let config = AppConfig::load(&flags)?;
    let report = checkout_cli::run(&config)?;
    print!("{report}");
    Ok(())
}
