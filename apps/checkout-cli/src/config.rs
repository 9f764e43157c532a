//! # Runner Configuration
//!
//! Where the products and the rule set come from, and how the report is
//! laid out.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --products cart.json --rules rules.toml --sort-by-note             │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     TALLY_PRODUCTS=./cart.json                                         │
//! │     TALLY_RULES=./rules.toml                                           │
//! │     TALLY_SORT_BY_NOTE=true                                            │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, else TALLY_CONFIG, else ./tally.toml if present   │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     demo/products.json, demo/rules.toml, cart order                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tally.toml
//! products = "demo/products.json"
//! rules = "demo/rules.toml"
//! sort_by_note = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

pub const USAGE: &str = "\
Usage: tally-checkout [OPTIONS]

Prices a cart with the configured discount rules and prints the report.

Options:
  --config <PATH>     TOML config file (default: ./tally.toml if present)
  --products <PATH>   JSON array of product records
  --rules <PATH>      TOML rule set
  --sort-by-note      List purchased items grouped by discount note
  -h, --help          Print this help

Environment:
  TALLY_CONFIG, TALLY_PRODUCTS, TALLY_RULES, TALLY_SORT_BY_NOTE
  RUST_LOG            Log filter (default: info,tally=debug), logs go to stderr
";

// =============================================================================
// Command Line
// =============================================================================

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    pub config: Option<PathBuf>,
    pub products: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub sort_by_note: bool,
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Flags),
    Help,
}

/// Parses arguments (without the program name).
///
/// ```rust
/// use checkout_cli::config::{parse_args, Command};
///
/// let cmd = parse_args(["--rules", "r.toml", "--sort-by-note"].map(String::from)).unwrap();
/// match cmd {
///     Command::Run(flags) => assert!(flags.sort_by_note),
///     Command::Help => unreachable!(),
/// }
/// ```
pub fn parse_args<I>(args: I) -> CliResult<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut flags = Flags::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--sort-by-note" => flags.sort_by_note = true,
            "--config" => flags.config = Some(flag_value(&arg, args.next())?),
            "--products" => flags.products = Some(flag_value(&arg, args.next())?),
            "--rules" => flags.rules = Some(flag_value(&arg, args.next())?),
            other => {
                return Err(CliError::Usage(format!(
                    "unknown argument '{other}'\n\n{USAGE}"
                )))
            }
        }
    }

    Ok(Command::Run(flags))
}

fn flag_value(flag: &str, value: Option<String>) -> CliResult<PathBuf> {
    match value {
        Some(v) if !v.starts_with("--") => Ok(PathBuf::from(v)),
        _ => Err(CliError::Usage(format!("{flag} needs a path\n\n{USAGE}"))),
    }
}

// =============================================================================
// App Configuration
// =============================================================================

/// Resolved runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JSON array of product records.
    pub products: PathBuf,

    /// TOML rule set.
    pub rules: PathBuf,

    /// List purchased items ordered by their discount notes.
    pub sort_by_note: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            products: PathBuf::from("demo/products.json"),
            rules: PathBuf::from("demo/rules.toml"),
            sort_by_note: false,
        }
    }
}

impl AppConfig {
    /// Resolves the configuration from every source.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Read the config file if one is named or `./tally.toml` exists
    /// 3. Apply `TALLY_*` environment overrides
    /// 4. Apply command-line flags
    /// 5. Validate
    pub fn load(flags: &Flags) -> CliResult<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let explicit = flags
            .config
            .clone()
            .or_else(|| env("TALLY_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(env);
        config.apply_flags(flags);
        config.validate()?;

        info!(
            products = %config.products.display(),
            rules = %config.rules.display(),
            sort_by_note = config.sort_by_note,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Reads a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| CliError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `TALLY_*` overrides read through `lookup`.
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TALLY_PRODUCTS") {
            debug!(%path, "Overriding products path from environment");
            self.products = PathBuf::from(path);
        }

        if let Some(path) = lookup("TALLY_RULES") {
            debug!(%path, "Overriding rules path from environment");
            self.rules = PathBuf::from(path);
        }

        if let Some(value) = lookup("TALLY_SORT_BY_NOTE") {
            match parse_bool(&value) {
                Some(sort) => self.sort_by_note = sort,
                None => warn!(%value, "Ignoring TALLY_SORT_BY_NOTE, expected true or false"),
            }
        }
    }

    fn apply_flags(&mut self, flags: &Flags) {
        if let Some(path) = &flags.products {
            self.products = path.clone();
        }
        if let Some(path) = &flags.rules {
            self.rules = path.clone();
        }
        if flags.sort_by_note {
            self.sort_by_note = true;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        if self.products.as_os_str().is_empty() {
            return Err(CliError::InvalidConfig("products path is empty".into()));
        }

        if self.rules.as_os_str().is_empty() {
            return Err(CliError::InvalidConfig("rules path is empty".into()));
        }

        if self.products == self.rules {
            return Err(CliError::InvalidConfig(format!(
                "products and rules point at the same file: {}",
                self.products.display()
            )));
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
