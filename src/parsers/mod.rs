//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、序列化、文本节点遍历
//! - `macros` - 文本中嵌入指令的语法解析

pub mod html;
pub mod macros;

// Re-export commonly used items for convenience
pub use html::{get_all_text_nodes, html_to_dom, serialize_document};
pub use macros::{parse_directives, strip_directives, DataPair, DirectiveKind, Directives};
