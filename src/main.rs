mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use vt_av::{FfprobeProber, MediaProbe, ToolRegistry};
use vt_core::config::Config;

async fn start_server(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    api_token: Option<String>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if api_token.is_some() {
        config.auth.api_token = api_token;
    }

    tracing::info!("Starting video-transformer {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    vt_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "video_transformer=trace,vt_server=trace,vt_pipeline=trace,vt_av=trace,vt_db=debug,vt_core=debug,tower_http=debug".to_string()
        } else {
            "video_transformer=info,vt_server=info,vt_pipeline=info,vt_av=info,vt_db=info,vt_core=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start {
            host,
            port,
            api_token,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(cli.config.as_deref(), host, port, api_token))
        }
        Commands::Probe { file, json } => {
            let config = Config::load_or_default(cli.config.as_deref());
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&config, &file, json))
        }
        Commands::CheckTools => {
            let config = Config::load_or_default(cli.config.as_deref());
            check_tools(&config)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::GenerateApiToken => {
            println!("{}", generate_api_token());
            Ok(())
        }
        Commands::Version => {
            println!("video-transformer {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn probe_file(config: &Config, file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let tools = Arc::new(ToolRegistry::discover(&config.tools));
    let duration = FfprobeProber::new(tools).probe_duration(file).await?;
    let size = std::fs::metadata(file)?.len();

    if json {
        let out = serde_json::json!({
            "file": file.display().to_string(),
            "sizeInBytes": size,
            "durationInSeconds": duration,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let secs = duration as u64;
        println!("File: {}", file.display());
        println!("Size: {} bytes", size);
        println!(
            "Duration: {:.3}s ({:02}:{:02}:{:02})",
            duration,
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        );

        let policy = &config.upload;
        let verdict = if policy.duration_allowed(duration) {
            "within"
        } else {
            "outside"
        };
        println!(
            "Upload policy: {verdict} {}-{}s",
            policy.min_duration_secs, policy.max_duration_secs
        );
    }

    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let registry = ToolRegistry::discover(&config.tools);
    let tools = registry.check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!(
            "Some required tools are missing; \
             install ffmpeg or set tools.ffmpeg_path / tools.ffprobe_path"
        )
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = Config::load(p)?;
            println!("✓ Configuration parsed");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!("  Upload dir: {}", config.storage.upload_dir.display());
    println!("  Auth enabled: {}", config.auth.enabled);
    println!(
        "  Upload policy: max {}, {}-{}s",
        config.upload.max_size, config.upload.min_duration_secs, config.upload.max_duration_secs
    );
    println!("  Link expiry: {}s", config.sharing.default_expiry_secs);

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ No warnings");
    } else {
        for warning in &warnings {
            println!("⚠ {warning}");
        }
    }

    Ok(())
}

fn generate_api_token() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use rand::Rng;

    let bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_tokens_are_random_and_url_safe() {
        let a = generate_api_token();
        let b = generate_api_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn validate_rejects_unreadable_config() {
        assert!(validate_config(Some(Path::new("/nonexistent/vt.json"))).is_err());
    }

    #[test]
    fn validate_accepts_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vt.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(validate_config(Some(&path)).is_ok());
    }
}
