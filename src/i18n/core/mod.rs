//! 翻译引擎核心
//!
//! - `engine`：`I18nDom`，整树翻译、单节点翻译、语言切换与观察器回调
//! - `guard`：观察器的暂停与恢复

pub mod engine;
pub mod guard;

pub use engine::{EngineStats, I18nDom, I18nOptions, PassStats, TextOutcome};
pub use guard::{Observers, SuspendGuard};
