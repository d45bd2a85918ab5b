//! # 宿主文档模块
//!
//! 引擎运行所需的最小宿主环境：
//!
//! - `document` - 可观察的文档，所有树变更都在这里生成变更记录
//! - `observer` - `MutationObserver` 及其记录、选项
//!
//! 节点本身沿用 `markup5ever_rcdom` 的 `Handle`，
//! 节点种类即 `NodeData` 这个封闭枚举。

pub mod document;
pub mod observer;

pub use document::Document;
pub use observer::{MutationKind, MutationObserver, MutationRecord, ObserverOptions};
