//! `repolens init` — Write a default configuration file.

use repolens_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;

    println!("Wrote default config to {}", config_path.display());
    println!();
    println!("Set an API key via one of:");
    println!("  REPOLENS_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY");
    println!("  or the api_key field in the config file");
    Ok(())
}
