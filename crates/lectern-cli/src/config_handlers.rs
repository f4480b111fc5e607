//! Handler functions for `lectern config {path,get,set,init,export}`.
//!
//! Each handler returns the text to print so the dispatcher owns stdout.

use std::path::{Path, PathBuf};

use lectern_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::LecternConfig;

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path`
/// and `init` work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    let output = match action {
        ConfigAction::Path => cmd_config_path(config_path)?,
        ConfigAction::Get { key } => {
            let config = LecternConfig::load(config_path)?;
            cmd_config_get(&config, &key)?
        }
        ConfigAction::Set { key, value } => {
            let path = LecternConfig::resolve_config_path(config_path)
                .ok_or_else(|| Error::config("Could not determine config directory"))?;
            cmd_config_set(&path, &key, &value)?
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => LecternConfig::default_config_path()
                    .ok_or_else(|| Error::config("Could not determine config directory"))?,
            };
            cmd_config_init(&path, force)?
        }
        ConfigAction::Export { docker_env } => {
            let config = LecternConfig::load(config_path)?;
            cmd_config_export(&config, docker_env)?
        }
    };
    println!("{output}");
    Ok(())
}

// ============================================================================
// Command handlers
// ============================================================================

fn cmd_config_path(config_path: Option<&str>) -> Result<String> {
    let path = LecternConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    if !path.exists() {
        eprintln!("(file does not exist; run `lectern config init` to create it)");
    }
    Ok(path.display().to_string())
}

fn cmd_config_get(config: &LecternConfig, key: &str) -> Result<String> {
    let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Set a known key in the config file, refusing edits that would leave the
/// file unloadable.
fn cmd_config_set(path: &Path, key: &str, value: &str) -> Result<String> {
    let defaults = toml::Value::try_from(LecternConfig::default())
        .map_err(|e| Error::config(e.to_string()))?;
    if get_nested_value(&defaults, key).is_none() {
        return Err(Error::config(format!("Unknown configuration key '{key}'")));
    }
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `lectern config init` first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
    set_nested_value(&mut doc, key, parse_value(value))?;

    let toml_str = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    let updated: LecternConfig = toml::from_str(&toml_str)
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;
    updated.validate()?;

    std::fs::write(path, toml_str)?;
    Ok(format!("Set {key} = {value} in {}", path.display()))
}

fn cmd_config_init(path: &Path, force: bool) -> Result<String> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, LecternConfig::default().to_toml_string()?)?;
    Ok(format!("Config file created at {}", path.display()))
}

fn cmd_config_export(config: &LecternConfig, docker_env: bool) -> Result<String> {
    let lines: Vec<String> = config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        return Err(Error::config("Empty key path"));
    }

    let mut current = root;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(leaf.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value: bool, then integer, then string.
fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => s
            .parse::<i64>()
            .map(toml::Value::Integer)
            .unwrap_or_else(|_| toml::Value::String(s.to_string())),
    }
}

fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn default_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, LecternConfig::default().to_toml_string().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_cmd_config_path_explicit() {
        let out = cmd_config_path(Some("/explicit/config.toml")).unwrap();
        assert_eq!(out, "/explicit/config.toml");
    }

    #[test]
    fn test_cmd_config_get() {
        let config = LecternConfig::default();
        assert_eq!(cmd_config_get(&config, "search.max_limit").unwrap(), "50");
        assert_eq!(
            cmd_config_get(&config, "api.base_url").unwrap(),
            "http://127.0.0.1:8080"
        );
        assert!(cmd_config_get(&config, "api").unwrap().contains("timeout_secs = 20"));

        let err = cmd_config_get(&config, "api.password").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_cmd_config_set() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_file(&dir);

        cmd_config_set(&path, "search.max_limit", "20").unwrap();
        cmd_config_set(&path, "api.base_url", "https://docs.example.org").unwrap();

        let config: LecternConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.search.max_limit, 20);
        assert_eq!(config.api.base_url, "https://docs.example.org");
    }

    #[test]
    fn test_cmd_config_set_rejects_bad_edits() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = default_file(&dir);
        let before = std::fs::read_to_string(&path).unwrap();

        let err = cmd_config_set(&path, "search.colour", "blue").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
        let err = cmd_config_set(&path, "search.max_limit", "lots").unwrap_err();
        assert!(err.to_string().contains("Invalid value"));
        let err = cmd_config_set(&path, "search.max_limit", "0").unwrap_err();
        assert!(err.to_string().contains("max_limit"));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_cmd_config_set_missing_file() {
        let err = cmd_config_set(Path::new("/nonexistent/config.toml"), "api.base_url", "x")
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_cmd_config_init() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lectern").join("config.toml");

        cmd_config_init(&path, false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[api]"));
        assert!(content.contains("[search]"));

        let err = cmd_config_init(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        std::fs::write(&path, "old").unwrap();
        cmd_config_init(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[api]"));
    }

    #[test]
    fn test_cmd_config_export() {
        let config = LecternConfig::default();
        let plain = cmd_config_export(&config, false).unwrap();
        assert!(plain.lines().any(|l| l == "LECTERN_SEARCH__MAX_LIMIT=50"));
        let docker = cmd_config_export(&config, true).unwrap();
        assert!(docker.lines().all(|l| l.starts_with("--env LECTERN_")));
    }

    #[test]
    fn test_nested_value_helpers() {
        let mut val = toml::Value::Table(toml::map::Map::new());
        set_nested_value(&mut val, "search.max_limit", toml::Value::Integer(30)).unwrap();
        assert_eq!(
            get_nested_value(&val, "search.max_limit"),
            Some(&toml::Value::Integer(30))
        );
        assert!(get_nested_value(&val, "search.nope").is_none());
        assert!(set_nested_value(&mut val, "search.max_limit.x", toml::Value::Integer(1)).is_err());
        assert!(set_nested_value(&mut val, "", toml::Value::Integer(1)).is_err());
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(
            parse_value("https://x.org"),
            toml::Value::String("https://x.org".to_string())
        );
    }
}
