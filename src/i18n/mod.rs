//! 页面内翻译
//!
//! 资源表按位置对应各语言的字符串，引擎在文档上原地替换文本节点，
//! 并通过两个变更观察器跟踪之后的插入和修改。

pub mod config;
pub mod core;
pub mod error;
pub mod resource;

pub use config::{ConfigManager, I18nConfig};
pub use self::core::{EngineStats, I18nDom, I18nOptions, PassStats, TextOutcome};
pub use error::{I18nError, I18nResult};
pub use resource::ResourceTable;
