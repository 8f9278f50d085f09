use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ativeplay_catalog::{
    merge_sources_concurrent, CatalogState, Config, PlaylistSource, SourceError,
};

/// Configuration from `CATALOG_CONFIG_FILE` (JSON) when set, environment otherwise
async fn load_config() -> Result<Config> {
    match std::env::var("CATALOG_CONFIG_FILE") {
        Ok(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read config file {}", path))?;
            serde_json::from_str(&raw).with_context(|| format!("Invalid config file {}", path))
        }
        Err(_) => Ok(Config::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging (stderr, stdout carries the catalog)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ativeplay_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("usage: ativeplay-catalog <playlist.m3u>...");
    }

    let config = Arc::new(load_config().await?);
    tracing::info!(
        max_lines = config.max_lines,
        max_line_length = config.max_line_length,
        default_group = %config.default_group,
        "Catalog engine configured"
    );

    // Unreadable files are skipped like any other bad source
    let mut sources = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match tokio::fs::read(&path).await {
            Ok(content) => sources.push(PlaylistSource::new(path, content)),
            Err(e) => unreadable.push((path, SourceError::Unreadable(e.to_string()))),
        }
    }

    let mut merged = merge_sources_concurrent(sources, config).await;
    for (path, error) in unreadable {
        merged.skip_source(&path, error);
    }

    let output = serde_json::json!({
        "state": merged.state(),
        "stats": merged.catalog.stats(),
        "catalog": &merged.catalog,
        "diagnostics": &merged.diagnostics,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize catalog")?
    );

    if merged.state() == CatalogState::Empty {
        bail!("Merged catalog is empty ({} source(s) skipped)", merged.sources_skipped);
    }

    Ok(())
}
