use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use crate::config::proc_loader::file_to_config;
use crate::config::service::ServiceConfig;
use crate::config::token::DEFAULT_ENV_FILE;

/// Load the env file into the process environment, then the YAML config.
///
/// Variables already set in the environment win over the env file. A missing
/// env file is not an error: the first successful mint creates it. An explicit
/// `env_file` is also where refreshed tokens are persisted.
pub async fn run(config_path: &str, env_file: Option<&str>) -> Result<ServiceConfig> {
    load_env_file(Path::new(env_file.unwrap_or(DEFAULT_ENV_FILE)));

    let path = Path::new(config_path);
    let mut service_config = file_to_config(path)
        .await
        .map_err(|e| anyhow!("Invalid config format: {}", e))?;

    if let Some(env_file) = env_file {
        if service_config.token.env_file != env_file {
            debug!(
                "token.env_file '{}' overridden by '{}'",
                service_config.token.env_file, env_file
            );
        }
        service_config.token.env_file = env_file.to_string();
    }
    Ok(service_config)
}

fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => debug!("loaded env file {}", path.display()),
        Err(e) if e.not_found() => debug!("env file {} not found", path.display()),
        Err(e) => warn!("failed to load env file {}: {}", path.display(), e),
    }
}
