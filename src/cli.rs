use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "video-transformer")]
#[command(author, version, about = "Upload, trim, merge and share videos over HTTP")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bearer token every request must present (overrides config)
        #[arg(long, env = "VT_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,
    },

    /// Print the duration of a media file as reported by ffprobe
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that ffmpeg and ffprobe are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Generate a random API token for the `auth.api_token` setting
    GenerateApiToken,

    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn start_flags_parse() {
        let cli = Cli::try_parse_from([
            "video-transformer",
            "start",
            "--port",
            "8081",
            "--api-token",
            "abc",
        ])
        .unwrap();
        match cli.command {
            Commands::Start {
                host,
                port,
                api_token,
            } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8081));
                assert_eq!(api_token.as_deref(), Some("abc"));
            }
            _ => panic!("expected start"),
        }
    }
}
