//! Command line for the aurum-server binary.
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::utils::toml_config::{AurumConfig, ConfigError};
use clap::{Parser, Subcommand};
use output::Output;
use std::path::{Path, PathBuf};

/// Aurum - accounts, sessions and precious-metals prices over HTTP
#[derive(Parser, Debug)]
#[command(
    name = "aurum-server",
    author = "Aurum Labs <build@aurum-labs.dev>",
    version,
    about = "Aurum - accounts, sessions and precious-metals prices over HTTP",
    long_about = "Serves user registration, login and cookie/JWT sessions plus a read-only\n\
                  price lookup backed by CSV files.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  aurum-server                          # Start the server (reads aurum.toml)\n    \
                  aurum-server --config prod.toml       # Use a custom config file\n    \
                  aurum-server config --validate        # Check configuration and secrets"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "aurum.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the resolved configuration
    Config {
        /// Validate the configuration and the secrets it references
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn output(&self) -> Output {
        if self.no_color {
            Output::no_color()
        } else {
            Output::new()
        }
    }
}

/// Print the configuration found at `path` and optionally validate it.
///
/// Secret values are never printed; only whether their env vars are set.
pub fn show_config(path: &Path, validate: bool, output: &Output) -> Result<(), ConfigError> {
    let config = AurumConfig::load_or_default(path)?;

    output.header("Configuration");
    output.kv("file", &path.display().to_string());
    output.kv("listen", &config.bind_address());
    output.kv("log level", &config.server.log_level);
    output.kv("database", &config.database.url);
    output.kv("token ttl", &format!("{}s", config.auth.token_ttl_secs));
    output.kv(
        "secure cookies",
        if config.auth.secure_cookies { "yes" } else { "no" },
    );
    output.kv(
        &config.auth.jwt_secret_env,
        if config.jwt_secret().is_ok() { "<set>" } else { "<missing>" },
    );

    output.subheader("Market data");
    output.kv("assets", &config.market.assets_dir.display().to_string());
    for instrument in &config.market.instruments {
        output.list_item(instrument);
    }

    if validate {
        output.subheader("Validation");
        match config.validate_with_warnings() {
            Ok(warnings) => {
                for warning in &warnings {
                    output.warning(&warning.message);
                }
                output.success("Configuration is valid");
            }
            Err(e) => {
                output.error(&e.to_string());
                return Err(e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["aurum-server"]).unwrap();

        assert_eq!(cli.config, PathBuf::from("aurum.toml"));
        assert!(!cli.verbose);
        assert!(!cli.no_color);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "aurum-server",
            "config",
            "--validate",
            "--config",
            "prod.toml",
            "--no-color",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("prod.toml"));
        assert!(cli.no_color);
        assert_eq!(cli.command, Some(Commands::Config { validate: true }));
        assert!(!cli.output().colored);
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["aurum-server", "init"]).is_err());
    }

    #[test]
    fn test_show_config_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aurum.toml");
        std::fs::write(
            &path,
            "[auth]\njwt_secret_env = \"AURUM_CLI_TEST_UNSET_SECRET\"\n",
        )
        .unwrap();

        let output = Output::no_color();
        assert!(show_config(&path, false, &output).is_ok());
        assert!(matches!(
            show_config(&path, true, &output),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
