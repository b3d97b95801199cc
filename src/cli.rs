//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::warn;
use std::path::PathBuf;

use shared_resources::cancel::CancellationToken;
use shared_resources::defaults::{default_global_config_path, GLOBAL_CONFIG_ENV};
use shared_resources::output::OutputConfig;

use crate::commands::{self, Context};

/// Shared Resources - declare build targets once, import and build them everywhere
#[derive(Parser, Debug)]
#[command(name = "shared-resources")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Location of the global resources file
    #[arg(long, global = true, value_name = "FILE", env = GLOBAL_CONFIG_ENV)]
    global_config: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a repository's shared resources into the global resources
    Import(commands::import::ImportArgs),

    /// Build container images for shared resources
    Build(commands::build::BuildArgs),

    /// List global shared resources
    List(commands::list::ListArgs),

    /// Remove a resource from the global resources
    Remove(commands::remove::RemoveArgs),

    /// Remove every resource from the global resources
    Clear(commands::clear::ClearArgs),

    /// Switch a resource between container and project mode
    Mode(commands::mode::ModeArgs),

    /// Write global resources into the current repository's settings
    Export(commands::export::ExportArgs),

    /// Reference another repository whose resources should be imported
    AddExternal(commands::add_external::AddExternalArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let command = match self.command {
            Commands::Completions(args) => return commands::completions::execute(args),
            command => command,
        };

        let cancel = CancellationToken::new();
        install_interrupt_handler(&cancel);

        let output = OutputConfig::from_env_and_flag(&self.color);
        let global_config = self
            .global_config
            .unwrap_or_else(default_global_config_path);
        let ctx = Context::new(output, cancel, global_config);

        match command {
            Commands::Import(args) => commands::import::execute(args, &ctx),
            Commands::Build(args) => commands::build::execute(args, &ctx),
            Commands::List(args) => commands::list::execute(args, &ctx),
            Commands::Remove(args) => commands::remove::execute(args, &ctx),
            Commands::Clear(args) => commands::clear::execute(args, &ctx),
            Commands::Mode(args) => commands::mode::execute(args, &ctx),
            Commands::Export(args) => commands::export::execute(args, &ctx),
            Commands::AddExternal(args) => commands::add_external::execute(args, &ctx),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// First Ctrl-C cancels the token; the current step finishes, later ones are skipped.
fn install_interrupt_handler(cancel: &CancellationToken) {
    let token = cancel.clone();
    let installed = ctrlc::set_handler(move || {
        if !token.is_cancelled() {
            eprintln!("\nInterrupted, stopping after the current step...");
        }
        token.cancel();
    });
    if let Err(e) = installed {
        warn!("could not install interrupt handler: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_flags_parse() {
        let cli = Cli::try_parse_from([
            "shared-resources",
            "build",
            "api",
            "worker",
            "--force",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.ids, vec!["api", "worker"]);
                assert!(args.force);
                assert!(!args.global);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_mode_rejects_unknown_value() {
        assert!(Cli::try_parse_from(["shared-resources", "mode", "api", "vm"]).is_err());
    }
}
