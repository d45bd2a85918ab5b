//! 统一错误处理
//!
//! 翻译过程本身没有致命错误：查找失败、指令格式错误都会退化为原文直通。
//! 这里的错误只出现在构造、配置加载、资源解析、序列化等边界上。

use std::fmt;

use thiserror::Error;

/// 错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 资源表错误
    #[error("资源表错误: {0}")]
    ResourceError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 传入的节点不是文本节点
    #[error("节点不是文本节点")]
    NotTextNode,
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl I18nError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            I18nError::ConfigError(_) => ErrorSeverity::Critical,
            I18nError::ResourceError(_) => ErrorSeverity::Critical,
            I18nError::ParseError(_) => ErrorSeverity::Error,
            I18nError::IoError(_) => ErrorSeverity::Error,
            I18nError::SerializationError(_) => ErrorSeverity::Error,
            I18nError::NotTextNode => ErrorSeverity::Warning,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let new_msg = format!("{} (上下文: {})", self, context);

        match &mut self {
            I18nError::ConfigError(ref mut msg) => *msg = new_msg,
            I18nError::ResourceError(ref mut msg) => *msg = new_msg,
            I18nError::ParseError(ref mut msg) => *msg = new_msg,
            I18nError::IoError(ref mut msg) => *msg = new_msg,
            I18nError::SerializationError(ref mut msg) => *msg = new_msg,
            I18nError::NotTextNode => {}
        }

        self
    }
}

impl From<std::io::Error> for I18nError {
    fn from(error: std::io::Error) -> Self {
        I18nError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for I18nError {
    fn from(error: serde_json::Error) -> Self {
        I18nError::ParseError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for I18nError {
    fn from(error: toml::de::Error) -> Self {
        I18nError::ParseError(format!("TOML解析错误: {}", error))
    }
}

/// 错误结果类型别名
pub type I18nResult<T> = Result<T, I18nError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &I18nError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("{}", error),
            ErrorSeverity::Warning => tracing::warn!("{}", error),
            ErrorSeverity::Error => tracing::error!("{}", error),
            ErrorSeverity::Critical => tracing::error!("严重错误: {}", error),
        }
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> I18nError {
        I18nError::ConfigError(msg.to_string())
    }

    /// 创建资源表错误
    pub fn resource_error<T: fmt::Display>(msg: T) -> I18nError {
        I18nError::ResourceError(msg.to_string())
    }
}
