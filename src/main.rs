mod api;
mod backend;
mod config;
mod filter;
mod metrics;
mod models;
mod report;
mod run;
mod session;
mod ui;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env();
    let data_dir = get_data_dir()?;

    // Log to a file in development; stdout belongs to the terminal UI.
    if config.is_development {
        init_file_logging(&data_dir)?;
        tracing::info!(
            app = %config.app_name,
            version = %config.app_version,
            api_url = %config.api_url,
            "starting"
        );
    }

    let store = session::TokenStore::new(data_dir.join("auth_token"));
    let mut backend = backend::Backend::new(&config, store)?;

    match args.len() {
        1 => run::as_tui(&mut backend),
        2.. => run::as_cli(&args, &mut backend),
        _ => {
            eprintln!("Usage: nextmove [command]");
            Ok(())
        }
    }
}

fn get_data_dir() -> Result<std::path::PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "nextmove", "NextMove")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

fn init_file_logging(data_dir: &std::path::Path) -> Result<()> {
    let log_file = std::fs::File::create(data_dir.join("nextmove.log"))
        .context("Failed to create log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nextmove_tui=debug")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}
