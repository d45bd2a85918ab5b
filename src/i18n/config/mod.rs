//! 配置管理模块
//!
//! 配置文件、`.env`、环境变量和默认值依次叠加

pub mod manager;

pub use manager::{ConfigManager, I18nConfig};

/// 配置常量
pub mod constants {
    /// 既没有显式指定也没有 `<html lang>` 时的原文语言
    pub const DEFAULT_HTML_LANGUAGE: &str = "en";

    pub const DEFAULT_ENCODING: &str = "utf-8";

    pub const DEFAULT_LOG_LEVEL: &str = "info";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "i18n-dom.toml",
        ".i18n-dom.toml",
        "i18n-dom.json",
        "~/.config/i18n-dom/config.toml",
        "/etc/i18n-dom/config.toml",
    ];

    pub const ENV_FILES: &[&str] = &[".env.local", ".env.development", ".env.production", ".env"];
}
