use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use kotoba_config::Config;
use serde::Deserialize;

/// Profile picked up from the working directory when no path is given
pub const DEFAULT_PROFILE: &str = "kotoba.json";

/// A named profile, or a bare config object
#[derive(Deserialize)]
#[serde(untagged)]
enum ProfileFile {
    Named { name: String, value: Config },
    Bare(Config),
}

/// Resolve the config: profile file first, then the environment on top
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let base = match path {
        Some(path) => read_profile(path)?,
        None if Path::new(DEFAULT_PROFILE).exists() => read_profile(Path::new(DEFAULT_PROFILE))?,
        None => {
            tracing::debug!("No profile found, using defaults");
            Config::default()
        }
    };

    Ok(base.with_overrides(|key| env::var(key).ok()))
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let file =
        File::open(path).with_context(|| format!("cannot open profile {}", path.display()))?;
    let profile: ProfileFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid profile {}", path.display()))?;

    let config = match profile {
        ProfileFile::Named { name, value } => {
            tracing::info!("Loaded profile '{}' from {}", name, path.display());
            value
        }
        ProfileFile::Bare(config) => {
            tracing::info!("Loaded config from {}", path.display());
            config
        }
    };
    Ok(config)
}
