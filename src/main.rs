use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::Env;
use log::info;

use tinychat::{pipeline, Config};

const DEFAULT_CONFIG: &str = "tinychat.json";

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.init();
}

/// Config from the first argument, else `tinychat.json` if present, else defaults
fn load_config() -> Result<Config> {
    match env::args().nth(1) {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("failed to load config {}", path)),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::from_file(DEFAULT_CONFIG)
            .with_context(|| format!("failed to load config {}", DEFAULT_CONFIG)),
        None => {
            info!("No config file, using defaults");
            Ok(Config::default())
        }
    }
}

fn main() -> Result<()> {
    init_logging();

    let config = load_config()?;
    let output = pipeline::run(&config).context("pipeline failed")?;

    println!("{}", output.text);
    Ok(())
}
