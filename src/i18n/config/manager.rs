//! 配置管理器
//!
//! 配置文件 → `.env` → 环境变量 → 校验

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use super::constants;
use crate::detect::DetectOptions;
use crate::i18n::error::{helpers, I18nError, I18nResult};
use crate::i18n::resource::ResourceTable;

/// 运行配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    /// 目标语言，缺省时由检测得到
    pub language: Option<String>,
    /// 文档原文语言，缺省时读取 `<html lang>`
    pub html_language: Option<String>,
    pub fallback_lng: Option<String>,
    /// JSON 资源表路径，相对路径以配置文件所在目录为基准
    pub resource: Option<PathBuf>,
    /// 输入文档编码，文档内 `<meta charset>` 优先
    pub encoding: String,
    pub log_level: String,
    pub detection: DetectOptions,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            language: None,
            html_language: None,
            fallback_lng: None,
            resource: None,
            encoding: constants::DEFAULT_ENCODING.to_string(),
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
            detection: DetectOptions::default(),
        }
    }
}

impl I18nConfig {
    /// 验证配置
    pub fn validate(&self) -> I18nResult<()> {
        if Encoding::for_label_no_replacement(self.encoding.as_bytes()).is_none() {
            return Err(helpers::config_error(format!(
                "未知的编码 \"{}\"",
                self.encoding
            )));
        }

        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(helpers::config_error(format!(
                "无效的日志级别 \"{}\"",
                self.log_level
            )));
        }

        for (field, value) in [
            ("language", &self.language),
            ("html_language", &self.html_language),
            ("fallback_lng", &self.fallback_lng),
        ] {
            if value.as_deref().is_some_and(|lang| lang.trim().is_empty()) {
                return Err(helpers::config_error(format!("{} 不能为空字符串", field)));
            }
        }

        if self.detection.order.is_empty() {
            tracing::warn!("detection order is empty, language detection disabled");
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{core, i18n, EnvVar};

        match i18n::Language::get_optional() {
            Ok(Some(language)) => self.language = Some(language),
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match i18n::HtmlLanguage::get_optional() {
            Ok(Some(language)) => self.html_language = Some(language),
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match i18n::FallbackLng::get_optional() {
            Ok(Some(language)) => self.fallback_lng = Some(language),
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match i18n::Resource::get_optional() {
            Ok(Some(path)) => {
                tracing::info!("环境变量覆盖资源表: {}", path.display());
                self.resource = Some(path);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match core::LogLevel::get_optional() {
            Ok(Some(level)) => self.log_level = level,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }
    }

    /// 读取配置中指定的资源表
    pub fn load_resource(&self) -> I18nResult<ResourceTable> {
        let path = self
            .resource
            .as_ref()
            .ok_or_else(|| helpers::config_error("未指定资源表文件"))?;
        ResourceTable::from_json_file(path)
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: I18nConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 按搜索路径查找配置文件，找不到时使用默认配置
    pub fn new() -> I18nResult<Self> {
        Self::load_dotenv();

        let (config, source) = match Self::find_config_file() {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                (Self::load_from_file(&path)?, Some(path))
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                (I18nConfig::default(), None)
            }
        };

        Self::finish(config, source)
    }

    /// 使用指定的配置文件
    pub fn from_path<P: AsRef<Path>>(path: P) -> I18nResult<Self> {
        Self::load_dotenv();

        let path = PathBuf::from(shellexpand::tilde(&path.as_ref().to_string_lossy()).as_ref());
        let config = Self::load_from_file(&path)?;
        Self::finish(config, Some(path))
    }

    fn finish(mut config: I18nConfig, source: Option<PathBuf>) -> I18nResult<Self> {
        config.apply_env_overrides();
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn get_config(&self) -> &I18nConfig {
        &self.config
    }

    pub fn into_config(self) -> I18nConfig {
        self.config
    }

    /// 实际加载的配置文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 从指定文件加载配置，`.toml` 按 TOML 解析，其余按 JSON 解析
    pub fn load_from_file(path: &Path) -> I18nResult<I18nConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| helpers::config_error(format!("读取配置文件失败: {}", e)))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let mut config: I18nConfig = if is_toml {
            toml::from_str(&content)
                .map_err(|e| helpers::config_error(format!("解析TOML配置失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| helpers::config_error(format!("解析JSON配置失败: {}", e)))?
        };

        if let (Some(resource), Some(dir)) = (config.resource.as_ref(), path.parent()) {
            if resource.is_relative() {
                config.resource = Some(dir.join(resource));
            }
        }

        Ok(config)
    }

    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> I18nResult<()> {
        let config = I18nConfig {
            language: Some("es".to_string()),
            resource: Some(PathBuf::from("locales.json")),
            ..I18nConfig::default()
        };
        let content = toml::to_string_pretty(&config)
            .map_err(|e| I18nError::SerializationError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| helpers::config_error(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{CacheTarget, DetectSource};
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml_merges_defaults() {
        let file = write_temp(
            ".toml",
            r#"
language = "es"
resource = "table.json"

[detection]
order = ["cookie", "navigator"]
"#,
        );
        let config = ConfigManager::load_from_file(file.path()).unwrap();

        assert_eq!(config.language.as_deref(), Some("es"));
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(
            config.detection.order,
            vec![DetectSource::Cookie, DetectSource::Navigator]
        );
        assert_eq!(config.detection.lookup_cookie, "i18n_dom");
        assert_eq!(config.detection.caches, vec![CacheTarget::LocalStorage]);

        // 相对路径以配置文件目录为基准
        let dir = file.path().parent().unwrap();
        assert_eq!(config.resource, Some(dir.join("table.json")));
    }

    #[test]
    fn test_load_json() {
        let file = write_temp(".json", r#"{"html_language": "fr", "log_level": "debug"}"#);
        let config = ConfigManager::load_from_file(file.path()).unwrap();

        assert_eq!(config.html_language.as_deref(), Some("fr"));
        assert_eq!(config.log_level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_files() {
        let file = write_temp(".toml", "language = [");
        assert!(matches!(
            ConfigManager::load_from_file(file.path()),
            Err(I18nError::ConfigError(_))
        ));

        assert!(matches!(
            ConfigManager::load_from_file(Path::new("/nonexistent/i18n-dom.toml")),
            Err(I18nError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(I18nConfig::default().validate().is_ok());

        let config = I18nConfig {
            encoding: "klingon".to_string(),
            ..I18nConfig::default()
        };
        assert!(config.validate().is_err());

        let config = I18nConfig {
            log_level: "loud".to_string(),
            ..I18nConfig::default()
        };
        assert!(config.validate().is_err());

        let config = I18nConfig {
            language: Some(" ".to_string()),
            ..I18nConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_resource() {
        assert!(matches!(
            I18nConfig::default().load_resource(),
            Err(I18nError::ConfigError(_))
        ));
    }

    #[test]
    fn test_generate_example_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i18n-dom.toml");
        ConfigManager::generate_example_config(&path).unwrap();

        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.language.as_deref(), Some("es"));
        assert_eq!(config.resource, Some(dir.path().join("locales.json")));
        assert_eq!(config.detection, DetectOptions::default());
    }
}
