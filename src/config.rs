use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 程序配置
///
/// 加载顺序：默认值 → `config.toml`（可选）→ 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 单次 API 调用的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 两份报告之间的间隔（毫秒），0 表示不等待
    pub file_interval_ms: u64,
    // --- 输出配置 ---
    /// 输出文件夹名称，位于输入文件夹的同级目录
    pub output_folder_name: String,
    /// 评语文件名前缀
    pub output_prefix: String,
    /// 观察者轮询进度的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 默认日志级别（RUST_LOG 优先）
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.deepseek.com".to_string(),
            llm_model_name: "deepseek-chat".to_string(),
            temperature: 0.2,
            max_tokens: 2000,
            request_timeout_secs: 60,
            file_interval_ms: 0,
            output_folder_name: "graded_feedback".to_string(),
            output_prefix: "评语_".to_string(),
            poll_interval_ms: 100,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：读取配置文件（存在时），再用环境变量覆盖，最后校验
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match config_path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        let config = base.with_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::FileParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 只读取环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// 用 `lookup` 提供的变量覆盖当前配置
    pub fn with_overrides<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("LLM_API_KEY").or_else(|| lookup("DEEPSEEK_API_KEY"));
        Ok(Self {
            llm_api_key: api_key.unwrap_or(self.llm_api_key),
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: lookup("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            temperature: parse_var(&lookup, "LLM_TEMPERATURE", "f32")?.unwrap_or(self.temperature),
            max_tokens: parse_var(&lookup, "LLM_MAX_TOKENS", "u32")?.unwrap_or(self.max_tokens),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            file_interval_ms: parse_var(&lookup, "FILE_INTERVAL_MS", "u64")?
                .unwrap_or(self.file_interval_ms),
            output_folder_name: lookup("OUTPUT_FOLDER_NAME").unwrap_or(self.output_folder_name),
            output_prefix: lookup("OUTPUT_PREFIX").unwrap_or(self.output_prefix),
            poll_interval_ms: parse_var(&lookup, "POLL_INTERVAL_MS", "u64")?
                .unwrap_or(self.poll_interval_ms),
            log_level: lookup("LOG_LEVEL").unwrap_or(self.log_level),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "必须大于 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "必须大于 0"));
        }
        let folder = self.output_folder_name.trim();
        if folder.is_empty() || folder.contains(['/', '\\']) {
            return Err(invalid("output_folder_name", "必须是单层文件夹名称"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn file_interval(&self) -> Duration {
        Duration::from_millis(self.file_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 读取评分标准：优先使用命令行直接给出的文本，否则读取文件
///
/// 评分标准为空时返回错误，批阅流程本身不再校验
pub fn load_rubric(inline: Option<&str>, rubric_file: &Path) -> Result<String, ConfigError> {
    let rubric = match inline {
        Some(text) => text.to_string(),
        None => std::fs::read_to_string(rubric_file).map_err(|source| {
            ConfigError::RubricReadFailed {
                path: PathBuf::from(rubric_file),
                source,
            }
        })?,
    };

    let rubric = rubric.trim().to_string();
    if rubric.is_empty() {
        return Err(ConfigError::EmptyRubric);
    }
    Ok(rubric)
}

fn parse_var<T, F>(lookup: &F, name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = Config::default();
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.output_folder_name, "graded_feedback");
        assert_eq!(config.output_prefix, "评语_");
        assert_eq!(config.poll_interval_ms, 100);
        assert!(config.llm_api_key.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides(lookup_from(&[
                ("DEEPSEEK_API_KEY", "sk-test"),
                ("REQUEST_TIMEOUT_SECS", "30"),
                ("FILE_INTERVAL_MS", "1000"),
            ]))
            .unwrap();
        assert_eq!(config.llm_api_key, "sk-test");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.file_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_llm_api_key_takes_precedence() {
        let config = Config::default()
            .with_overrides(lookup_from(&[
                ("LLM_API_KEY", "primary"),
                ("DEEPSEEK_API_KEY", "fallback"),
            ]))
            .unwrap();
        assert_eq!(config.llm_api_key, "primary");
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let err = Config::default()
            .with_overrides(lookup_from(&[("REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "REQUEST_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "llm_api_key = \"sk-file\"\nfile_interval_ms = 1000\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.llm_api_key, "sk-file");
        assert_eq!(config.file_interval_ms, 1000);
        assert_eq!(config.llm_model_name, "deepseek-chat");
    }

    #[test]
    fn test_load_rubric_rejects_blank() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rubric(Some("   \n"), &dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyRubric));

        let path = dir.path().join("rubric.txt");
        std::fs::write(&path, "实验目的 10分\n").unwrap();
        assert_eq!(load_rubric(None, &path).unwrap(), "实验目的 10分");
    }
}
