use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::error::ConfigError;
use crate::llm::DEFAULT_GEMINI_ENDPOINT;

pub const DEFAULT_MODEL_NAME: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FallbackPolicy {
    PrimaryThenFallback,
    PrimaryOnly,
    FallbackOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    Model,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model_name: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
        }
    }
}

impl ModelConfig {
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub model: ModelConfig,
    pub query_timeout: Duration,
    pub max_message_len: usize,
    pub format_mode: FormatMode,
    pub fallback_policy: FallbackPolicy,
}

#[derive(Debug, Clone)]
pub struct ConfigInputs<'a> {
    pub home_dir: &'a Path,
    pub cwd: &'a Path,
    pub database: Option<&'a Path>,
    pub model: ModelConfig,
    pub query_timeout_secs: u64,
    pub max_message_len: usize,
    pub prefer_templates: bool,
    pub fallback_policy: FallbackPolicy,
}

pub fn resolve_app_config(inputs: ConfigInputs<'_>) -> Result<AppConfig, ConfigError> {
    if !inputs.home_dir.is_absolute() {
        return Err(ConfigError::NotAbsolute(
            "home_dir",
            inputs.home_dir.display().to_string(),
        ));
    }
    if !inputs.cwd.is_absolute() {
        return Err(ConfigError::NotAbsolute(
            "cwd",
            inputs.cwd.display().to_string(),
        ));
    }
    if inputs.query_timeout_secs == 0 {
        return Err(ConfigError::NotPositive("query timeout"));
    }
    if inputs.model.timeout.is_zero() {
        return Err(ConfigError::NotPositive("model timeout"));
    }
    if inputs.max_message_len == 0 {
        return Err(ConfigError::NotPositive("max message length"));
    }

    let home_dir = normalize_lexical(inputs.home_dir);
    let cwd = normalize_lexical(inputs.cwd);
    let database_path = match inputs.database {
        Some(path) => resolve_user_path(path, &home_dir, &cwd)?,
        None => home_dir.join(".edusql").join("school.sqlite"),
    };

    let format_mode = if inputs.prefer_templates || !inputs.model.has_api_key() {
        FormatMode::Template
    } else {
        FormatMode::Model
    };

    Ok(AppConfig {
        database_path: normalize_lexical(&database_path),
        model: inputs.model,
        query_timeout: Duration::from_secs(inputs.query_timeout_secs),
        max_message_len: inputs.max_message_len,
        format_mode,
        fallback_policy: inputs.fallback_policy,
    })
}

fn resolve_user_path(path: &Path, home_dir: &Path, cwd: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: &Path) -> Result<PathBuf, ConfigError> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            Err(ConfigError::UnsupportedHomeExpansion(
                path.display().to_string(),
            ))
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use super::{
        ConfigInputs, DEFAULT_MAX_MESSAGE_LEN, FallbackPolicy, FormatMode, ModelConfig,
        resolve_app_config,
    };

    fn inputs<'a>(database: Option<&'a Path>) -> ConfigInputs<'a> {
        ConfigInputs {
            home_dir: Path::new("/home/tester"),
            cwd: Path::new("/work/repo"),
            database,
            model: ModelConfig::default(),
            query_timeout_secs: 10,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            prefer_templates: false,
            fallback_policy: FallbackPolicy::PrimaryThenFallback,
        }
    }

    #[test]
    fn defaults_database_under_edusql_home() {
        let config = resolve_app_config(inputs(None)).expect("config should resolve");
        assert_eq!(
            config.database_path,
            Path::new("/home/tester/.edusql/school.sqlite")
        );
        assert_eq!(config.query_timeout, Duration::from_secs(10));
        assert_eq!(config.max_message_len, 4_000);
    }

    #[test]
    fn expands_tilde_and_relative_database_paths() {
        let config = resolve_app_config(inputs(Some(Path::new("~/data/school.sqlite"))))
            .expect("tilde path should resolve");
        assert_eq!(
            config.database_path,
            Path::new("/home/tester/data/school.sqlite")
        );

        let config = resolve_app_config(inputs(Some(Path::new("./db/../db/school.sqlite"))))
            .expect("relative path should resolve");
        assert_eq!(config.database_path, Path::new("/work/repo/db/school.sqlite"));
    }

    #[test]
    fn template_formatting_without_api_key() {
        let config = resolve_app_config(inputs(None)).expect("config should resolve");
        assert_eq!(config.format_mode, FormatMode::Template);

        let mut with_key = inputs(None);
        with_key.model.api_key = Some("secret".to_string());
        let config = resolve_app_config(with_key.clone()).expect("config should resolve");
        assert_eq!(config.format_mode, FormatMode::Model);

        with_key.prefer_templates = true;
        let config = resolve_app_config(with_key).expect("config should resolve");
        assert_eq!(config.format_mode, FormatMode::Template);
    }

    #[test]
    fn rejects_relative_home_and_zero_limits() {
        let mut bad_home = inputs(None);
        bad_home.home_dir = Path::new("home/tester");
        let error = resolve_app_config(bad_home).expect_err("relative home must fail");
        assert!(error.to_string().contains("home_dir must be absolute"));

        let mut zero_len = inputs(None);
        zero_len.max_message_len = 0;
        let error = resolve_app_config(zero_len).expect_err("zero length must fail");
        assert!(error.to_string().contains("greater than zero"));

        let error = resolve_app_config(inputs(Some(Path::new("~someone/school.sqlite"))))
            .expect_err("~user syntax must fail");
        assert!(error.to_string().contains("unsupported home expansion syntax"));
    }
}
