//! `repolens summarize` — Summarize a repository from the command line.

use repolens_config::AppConfig;
use repolens_core::PriorityFilter;
use repolens_pipeline::{SummarizeOptions, SummaryService};
use std::path::Path;
use std::sync::Arc;

pub async fn run(
    target: &str,
    priority: &str,
    show_metadata: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    REPOLENS_API_KEY   (generic)");
        eprintln!("    OPENAI_API_KEY     (for the default OpenAI backend)");
        eprintln!("    ANTHROPIC_API_KEY  (for provider = \"anthropic\")");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let priority = PriorityFilter::parse(priority)
        .ok_or("priority must be 'all', 'high', or 'high+medium'")?;

    let options = SummarizeOptions {
        priority,
        max_files: config.selector.max_files,
        token_budget: config.pipeline.token_budget,
        require_selector: false,
    };

    let model = repolens_providers::build_from_config(&config);
    let service = Arc::new(SummaryService::from_config(model, &config));

    // A target that is not an http(s) URL is treated as a local directory.
    let result = if target.starts_with("http://") || target.starts_with("https://") {
        service.summarize_url(target, &options).await?
    } else {
        service.summarize_local(Path::new(target), &options).await?
    };

    println!("{}", result.summary);

    if show_metadata {
        println!();
        println!("---");
        println!("{}", serde_json::to_string_pretty(&result.metadata)?);
    }

    Ok(())
}
