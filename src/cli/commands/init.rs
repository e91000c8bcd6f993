use std::path::{Path, PathBuf};

use crate::config::{Config, SecretString};
use crate::services::generate_secret;

/// Writes a default config whose signing secret is freshly generated.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn cmd_init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(Config::default_config_path);

    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    write_initial_config(&path)?;

    println!("✓ Config written to {}", path.display());
    println!("  Keep this file private: it contains the token signing secret.");
    Ok(())
}

fn write_initial_config(path: &Path) -> anyhow::Result<()> {
    let mut config = Config::default();
    config.security.jwt_secret = SecretString::new(generate_secret());
    config.save_to_path(path)
}
