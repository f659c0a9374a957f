mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./ffpass.toml",
        "~/.config/ffpass/config.toml",
        "/etc/ffpass/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand(path: &mut Option<PathBuf>) {
    if let Some(p) = path {
        let expanded = shellexpand::tilde(&p.to_string_lossy()).into_owned();
        *p = PathBuf::from(expanded);
    }
}

fn expand_paths(config: &mut Config) {
    expand(&mut config.tools.ffmpeg_path);
    expand(&mut config.tools.ffprobe_path);
    expand(&mut config.encoding.temp_dir);
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.tools.threads == Some(0) {
        anyhow::bail!("tools.threads cannot be 0");
    }
    if config.tools.timeout_secs == Some(0) {
        anyhow::bail!("tools.timeout_secs cannot be 0");
    }

    if let Some(dir) = &config.encoding.temp_dir {
        if !dir.is_dir() {
            tracing::warn!("Temp dir does not exist: {:?}", dir);
        }
    }

    for (name, preset) in &config.presets {
        if preset.format().passes() == 0 {
            anyhow::bail!("Preset '{}' has a pass count of 0", name);
        }
    }

    Ok(())
}

/// Look up a preset by name
pub fn preset<'a>(config: &'a Config, name: &str) -> Result<&'a Preset> {
    config.presets.get(name).with_context(|| {
        let known: Vec<_> = config.presets.keys().map(String::as_str).collect();
        format!("Unknown preset '{}' (known: {})", name, known.join(", "))
    })
}
