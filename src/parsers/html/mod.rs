//! HTML解析和处理模块
//!
//! - `dom`: 解析与基础DOM操作
//! - `serializer`: 序列化功能
//! - `walker`: 文本节点遍历

pub mod dom;
pub mod serializer;
pub mod walker;

// 重新导出主要的公共 API
pub use dom::{
    get_charset, get_child_index, get_child_node_by_name, get_comment_content, get_node_attr,
    get_node_name, get_parent_node, get_text_content, html_to_dom, is_inclusive_ancestor,
    next_sibling,
};
pub use serializer::serialize_document;
pub use walker::get_all_text_nodes;
