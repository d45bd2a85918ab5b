//! 文本节点遍历
//!
//! 引擎只关心子树中的文本节点。这里提供与浏览器 `TreeWalker`
//! (`NodeFilter.SHOW_TEXT`) 相同的遍历结果：根节点之下的全部文本节点，
//! 按文档顺序排列，根节点本身不计入。

use markup5ever_rcdom::{Handle, NodeData};

/// 收集 `root` 子树中的全部文本节点
///
/// 返回的是节点句柄的快照：遍历结束后对树的修改（例如插入注释节点）
/// 不会影响已返回的列表。
pub fn get_all_text_nodes(root: &Handle) -> Vec<Handle> {
    let mut text_nodes = Vec::new();

    for child in root.children.borrow().iter() {
        collect_text_nodes(child, &mut text_nodes);
    }

    text_nodes
}

fn collect_text_nodes(node: &Handle, text_nodes: &mut Vec<Handle>) {
    if let NodeData::Text { .. } = node.data {
        text_nodes.push(node.clone());
        return;
    }

    for child in node.children.borrow().iter() {
        collect_text_nodes(child, text_nodes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{get_text_content, html_to_dom};

    #[test]
    fn test_document_order() {
        let dom = html_to_dom(
            b"<div>one<p>two<b>three</b></p>four</div><!--skip--><span>five</span>",
            "utf-8".to_string(),
        );

        let texts: Vec<String> = get_all_text_nodes(&dom.document)
            .iter()
            .filter_map(get_text_content)
            .collect();

        assert_eq!(texts, vec!["one", "two", "three", "four", "five"]);
    }

    #[test]
    fn test_root_text_node_excluded() {
        let dom = html_to_dom(b"<p>only</p>", "utf-8".to_string());
        let texts = get_all_text_nodes(&dom.document);
        assert_eq!(texts.len(), 1);

        // 文本节点没有后代
        assert!(get_all_text_nodes(&texts[0]).is_empty());
    }
}
