//! 环境变量管理
//!
//! 每个变量是一个实现 [`EnvVar`] 的零大小类型，名称、默认值、说明和解析规则放在一起

use std::env;
use std::fmt;
use std::path::PathBuf;

/// 环境变量解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 未设置时返回 `Ok(None)`，设置了但无法解析时返回错误
    fn get_optional() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 通用环境变量
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "I18N_DOM_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 翻译相关环境变量
pub mod i18n {
    use super::*;

    /// 目标语言
    pub struct Language;
    impl EnvVar<String> for Language {
        const NAME: &'static str = "I18N_DOM_LANGUAGE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language code, e.g. 'es' or 'zh-CN'";

        fn parse(value: &str) -> EnvResult<String> {
            parse_language_tag(value, Self::NAME)
        }
    }

    /// 文档原文语言
    pub struct HtmlLanguage;
    impl EnvVar<String> for HtmlLanguage {
        const NAME: &'static str = "I18N_DOM_HTML_LANGUAGE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Language the document is authored in (overrides <html lang>)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_language_tag(value, Self::NAME)
        }
    }

    /// 回退语言
    pub struct FallbackLng;
    impl EnvVar<String> for FallbackLng {
        const NAME: &'static str = "I18N_DOM_FALLBACK_LNG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Language used when the requested one is not in the resource table";

        fn parse(value: &str) -> EnvResult<String> {
            parse_language_tag(value, Self::NAME)
        }
    }

    /// 资源表文件
    pub struct Resource;
    impl EnvVar<PathBuf> for Resource {
        const NAME: &'static str = "I18N_DOM_RESOURCE";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str = "Path to the JSON resource table";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            let path = value.trim();
            if path.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Path cannot be empty".to_string(),
                });
            }
            Ok(PathBuf::from(shellexpand::tilde(path).as_ref()))
        }
    }
}

/// 语言代码只允许字母、数字、`-` 和 `_`
fn parse_language_tag(value: &str, var_name: &str) -> EnvResult<String> {
    let tag = value.trim();
    if tag.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Language code cannot be empty".to_string(),
        });
    }

    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Invalid language code '{}'", tag),
        });
    }

    Ok(tag.to_string())
}

/// 环境变量文档
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("Environment variables:\n");

    let entries = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (i18n::Language::NAME, i18n::Language::DESCRIPTION),
        (i18n::HtmlLanguage::NAME, i18n::HtmlLanguage::DESCRIPTION),
        (i18n::FallbackLng::NAME, i18n::FallbackLng::DESCRIPTION),
        (i18n::Resource::NAME, i18n::Resource::DESCRIPTION),
    ];
    for (name, description) in entries {
        docs.push_str(&format!("  {:<24} {}\n", name, description));
    }

    docs
}
