//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CinesyncConfig;
use crate::config::secret::secret_from;
use crate::domain::errors::CinesyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into CinesyncConfig
/// 4. Applies environment variable overrides (`CINESYNC_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, a
/// referenced environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<CinesyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CinesyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CinesyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CinesyncConfig = toml::from_str(&contents)
        .map_err(|e| CinesyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        CinesyncError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. All placeholders must resolve; the
/// full list of missing variables is reported at once.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CinesyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `CINESYNC_*` prefix
///
/// Environment variables follow the pattern `CINESYNC_<SECTION>_<KEY>`,
/// for example `CINESYNC_POSTGRES_CONNECTION_STRING`.
fn apply_env_overrides(config: &mut CinesyncConfig) {
    if let Ok(val) = std::env::var("CINESYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("CINESYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("CINESYNC_POSTGRES_CONNECTION_STRING") {
        config.postgres.connection_string = val;
    }

    if let Ok(val) = std::env::var("CINESYNC_ELASTICSEARCH_BASE_URL") {
        config.elasticsearch.base_url = val;
    }
    if let Ok(val) = std::env::var("CINESYNC_ELASTICSEARCH_USERNAME") {
        config.elasticsearch.username = Some(val);
    }
    if let Ok(val) = std::env::var("CINESYNC_ELASTICSEARCH_PASSWORD") {
        config.elasticsearch.password = Some(secret_from(val));
    }

    if let Ok(val) = std::env::var("CINESYNC_STATE_PATH") {
        config.state.path = val;
    }

    if let Ok(val) = std::env::var("CINESYNC_SYNC_STEP_SECONDS") {
        if let Ok(parsed) = val.parse() {
            config.sync.step_seconds = parsed;
        }
    }
    if let Ok(val) = std::env::var("CINESYNC_SYNC_REPEAT_SECONDS") {
        if let Ok(parsed) = val.parse() {
            config.sync.repeat_seconds = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CINESYNC_TEST_DB_PASSWORD", "s3cret");
        let input = "connection_string = \"postgresql://app:${CINESYNC_TEST_DB_PASSWORD}@db/movies\"";
        let output = substitute_env_vars(input).unwrap();
        assert!(output.contains("app:s3cret@db"));
        std::env::remove_var("CINESYNC_TEST_DB_PASSWORD");
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# uses ${NOT_A_REAL_VARIABLE_ANYWHERE}\nkey = \"value\"";
        let output = substitute_env_vars(input).unwrap();
        assert!(output.contains("${NOT_A_REAL_VARIABLE_ANYWHERE}"));
    }

    #[test]
    fn test_missing_variable_reported() {
        let input = "password = \"${DEFINITELY_UNSET_VARIABLE_42}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("DEFINITELY_UNSET_VARIABLE_42"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/cinesync.toml").unwrap_err();
        assert!(matches!(err, CinesyncError::Configuration(_)));
    }
}
