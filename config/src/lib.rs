//! Configuration for Lico.
//!
//! `~/.lico/config.toml` is parsed into the raw, all-optional [`LicoConfig`]
//! and then resolved once into [`ResolvedConfig`], which the rest of the
//! application consumes. Every field has a default, so a missing file is
//! equivalent to an empty one.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lico_types::{DEFAULT_UNIT, UiOptions};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_QUICK_SUGGESTIONS: [&str; 5] = ["Leche", "Pan", "Huevos", "Arroz", "Agua"];

const DATA_DIR_NAME: &str = ".lico";
const DATABASE_FILE: &str = "lico.db";

#[derive(Debug, Default, Deserialize)]
pub struct LicoConfig {
    pub app: Option<AppConfig>,
    pub storage: Option<StorageConfig>,
    pub suggestions: Option<SuggestionsConfig>,
    pub items: Option<ItemsConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for checkboxes, arrows and separators.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Shopping list database. Supports `~/` and `${VAR}`.
    pub database: Option<String>,
    /// Optional product catalog database; the bundled catalog is used otherwise.
    pub catalog: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsConfig {
    pub limit: Option<usize>,
    pub debounce_ms: Option<u64>,
    /// Names offered while the search field is empty.
    pub quick: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemsConfig {
    pub default_unit: Option<String>,
}

impl LicoConfig {
    /// Load the user config. `Ok(None)` when there is no home directory or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

/// Suggestion lookup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSettings {
    pub limit: usize,
    pub debounce: Duration,
    pub quick: Vec<String>,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SUGGESTION_LIMIT,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            quick: DEFAULT_QUICK_SUGGESTIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Configuration after defaults, path expansion and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub ui: UiOptions,
    pub database: PathBuf,
    pub catalog: Option<PathBuf>,
    pub suggestions: SuggestionSettings,
    pub default_unit: String,
}

impl ResolvedConfig {
    /// Defaults rooted at `data_dir`.
    #[must_use]
    pub fn defaults(data_dir: &Path) -> Self {
        Self::resolve(None, data_dir)
    }

    #[must_use]
    pub fn resolve(raw: Option<&LicoConfig>, data_dir: &Path) -> Self {
        let app = raw.and_then(|c| c.app.as_ref());
        let storage = raw.and_then(|c| c.storage.as_ref());
        let suggestions = raw.and_then(|c| c.suggestions.as_ref());
        let items = raw.and_then(|c| c.items.as_ref());

        let ui = UiOptions {
            ascii_only: app.is_some_and(|a| a.ascii_only),
            high_contrast: app.is_some_and(|a| a.high_contrast),
        };

        let database = storage
            .and_then(|s| s.database.as_deref())
            .and_then(resolve_path)
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE));
        let catalog = storage
            .and_then(|s| s.catalog.as_deref())
            .and_then(resolve_path);

        let mut settings = SuggestionSettings::default();
        if let Some(cfg) = suggestions {
            if let Some(limit) = cfg.limit.filter(|limit| *limit > 0) {
                settings.limit = limit;
            }
            if let Some(ms) = cfg.debounce_ms {
                settings.debounce = Duration::from_millis(ms);
            }
            if let Some(quick) = &cfg.quick {
                settings.quick = quick
                    .iter()
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string)
                    .collect();
            }
        }

        let default_unit = items
            .and_then(|i| i.default_unit.as_deref())
            .map(str::trim)
            .filter(|unit| !unit.is_empty())
            .unwrap_or(DEFAULT_UNIT)
            .to_string();

        Self {
            ui,
            database,
            catalog,
            suggestions: settings,
            default_unit,
        }
    }

    /// Load and resolve the user config.
    ///
    /// A config that cannot be read or parsed yields the defaults together with
    /// the error, so the caller can surface it without refusing to start.
    #[must_use]
    pub fn load() -> (Self, Option<ConfigError>) {
        let data_dir = data_dir();
        match LicoConfig::load() {
            Ok(raw) => (Self::resolve(raw.as_ref(), &data_dir), None),
            Err(err) => (Self::defaults(&data_dir), Some(err)),
        }
    }
}

/// `~/.lico`, or `./.lico` when no home directory is known.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(DATA_DIR_NAME), |home| home.join(DATA_DIR_NAME))
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME).join("config.toml"))
}

/// Replace `${VAR}` with the variable's value. Unset variables become empty;
/// an unclosed `${` is kept literally.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Expand env vars and a leading `~`. Blank values resolve to `None`.
fn resolve_path(raw: &str) -> Option<PathBuf> {
    let expanded = expand_env_vars(raw.trim());
    if expanded.is_empty() {
        return None;
    }
    if expanded == "~" {
        return dirs::home_dir();
    }
    if let Some(rest) = expanded.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Some(home.join(rest));
    }
    Some(PathBuf::from(expanded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_text: &str) -> LicoConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn expand_env_vars_no_vars() {
        assert_eq!(expand_env_vars("hello world"), "hello world");
    }

    #[test]
    fn expand_env_vars_single_var() {
        unsafe {
            env::set_var("LICO_TEST_CONFIG_VAR", "replaced");
        }
        assert_eq!(
            expand_env_vars("prefix ${LICO_TEST_CONFIG_VAR} suffix"),
            "prefix replaced suffix"
        );
        unsafe {
            env::remove_var("LICO_TEST_CONFIG_VAR");
        }
    }

    #[test]
    fn expand_env_vars_missing_var_becomes_empty() {
        unsafe {
            env::remove_var("LICO_MISSING_VAR_FOR_TEST");
        }
        assert_eq!(
            expand_env_vars("before ${LICO_MISSING_VAR_FOR_TEST} after"),
            "before  after"
        );
    }

    #[test]
    fn expand_env_vars_unclosed_and_empty() {
        assert_eq!(expand_env_vars("test ${UNCLOSED"), "test ${UNCLOSED");
        assert_eq!(expand_env_vars("a ${} b"), "a  b");
    }

    #[test]
    fn empty_config_resolves_to_defaults() {
        let dir = Path::new("/data");
        let resolved = ResolvedConfig::resolve(Some(&parse("")), dir);
        assert_eq!(resolved, ResolvedConfig::defaults(dir));
        assert_eq!(resolved.database, dir.join("lico.db"));
        assert_eq!(resolved.catalog, None);
        assert_eq!(resolved.suggestions.limit, 10);
        assert_eq!(resolved.suggestions.debounce, Duration::from_millis(250));
        assert_eq!(
            resolved.suggestions.quick,
            ["Leche", "Pan", "Huevos", "Arroz", "Agua"]
        );
        assert_eq!(resolved.default_unit, "uds");
        assert_eq!(resolved.ui, UiOptions::default());
    }

    #[test]
    fn full_config_overrides_defaults() {
        let raw = parse(
            r#"
            [app]
            ascii_only = true
            high_contrast = true

            [storage]
            database = "/tmp/compras.db"
            catalog = "/tmp/productos.db"

            [suggestions]
            limit = 3
            debounce_ms = 0
            quick = ["Café", "  ", " Sal "]

            [items]
            default_unit = "kg"
            "#,
        );
        let resolved = ResolvedConfig::resolve(Some(&raw), Path::new("/data"));
        assert!(resolved.ui.ascii_only);
        assert!(resolved.ui.high_contrast);
        assert_eq!(resolved.database, PathBuf::from("/tmp/compras.db"));
        assert_eq!(resolved.catalog, Some(PathBuf::from("/tmp/productos.db")));
        assert_eq!(resolved.suggestions.limit, 3);
        assert_eq!(resolved.suggestions.debounce, Duration::ZERO);
        assert_eq!(resolved.suggestions.quick, ["Café", "Sal"]);
        assert_eq!(resolved.default_unit, "kg");
    }

    #[test]
    fn invalid_values_fall_back() {
        let raw = parse(
            r#"
            [storage]
            database = "  "

            [suggestions]
            limit = 0

            [items]
            default_unit = " "
            "#,
        );
        let resolved = ResolvedConfig::resolve(Some(&raw), Path::new("/data"));
        assert_eq!(resolved.database, PathBuf::from("/data/lico.db"));
        assert_eq!(resolved.suggestions.limit, 10);
        assert_eq!(resolved.default_unit, "uds");
    }

    #[test]
    fn database_path_expands_env_vars() {
        unsafe {
            env::set_var("LICO_TEST_DB_DIR", "/srv/lico");
        }
        let raw = parse(
            r#"
            [storage]
            database = "${LICO_TEST_DB_DIR}/listas.db"
            "#,
        );
        let resolved = ResolvedConfig::resolve(Some(&raw), Path::new("/data"));
        assert_eq!(resolved.database, PathBuf::from("/srv/lico/listas.db"));
        unsafe {
            env::remove_var("LICO_TEST_DB_DIR");
        }
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = LicoConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[items]\ndefault_unit = \"g\"\n").unwrap();
        let loaded = LicoConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(
            loaded.items.and_then(|i| i.default_unit).as_deref(),
            Some("g")
        );
    }

    #[test]
    fn load_from_malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[suggestions\nlimit = ").unwrap();
        let err = LicoConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().contains("failed to parse config"));
    }
}
