//! # i18n-dom
//!
//! 在文档上原地翻译文本节点的引擎。译文来自按位置对应的多语言字符串表，
//! 文本中的 `I18N_` 指令用于区分同形文本、插入动态数据或跳过翻译。
//!
//! ## 模块组织
//!
//! - `parsers` - HTML 解析、序列化与指令语法
//! - `dom` - 可观察的宿主文档与变更观察器
//! - `detect` - 语言检测与持久化
//! - `i18n` - 资源表、翻译引擎、配置与错误类型
//! - `core` - 文档翻译流水线
//! - `env` - 环境变量

pub mod core;
pub mod detect;
pub mod dom;
pub mod env;
pub mod i18n;
pub mod parsers;

// Re-export commonly used items for convenience
pub use self::core::{translate_html, TranslateOptions, TranslateOutput};
pub use detect::{DetectOptions, Host, MemoryHost};
pub use dom::{Document, MutationObserver, MutationRecord, ObserverOptions};
pub use i18n::{
    ConfigManager, EngineStats, I18nConfig, I18nDom, I18nError, I18nOptions, I18nResult,
    PassStats, ResourceTable, TextOutcome,
};
pub use parsers::{parse_directives, strip_directives, DataPair, DirectiveKind, Directives};
