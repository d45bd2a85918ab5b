use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::rc::Rc;

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: String) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default()).one(s.as_str())
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// `parent` 是 `Cell<Option<Weak>>`，读取时必须先取出再放回。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 节点在父节点子列表中的位置
pub fn get_child_index(parent: &Handle, child: &Handle) -> Option<usize> {
    parent
        .children
        .borrow()
        .iter()
        .position(|node| Rc::ptr_eq(node, child))
}

/// 获取紧随其后的兄弟节点
pub fn next_sibling(node: &Handle) -> Option<Handle> {
    let parent = get_parent_node(node)?;
    let index = get_child_index(&parent, node)?;
    let children = parent.children.borrow();
    children.get(index + 1).cloned()
}

/// 判断 `node` 是否位于 `ancestor` 的子树中（包含自身）
pub fn is_inclusive_ancestor(ancestor: &Handle, node: &Handle) -> bool {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if Rc::ptr_eq(&candidate, ancestor) {
            return true;
        }
        current = get_parent_node(&candidate);
    }
    false
}

/// 读取文本节点内容，非文本节点返回 `None`
pub fn get_text_content(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 读取注释节点内容，非注释节点返回 `None`
pub fn get_comment_content(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Comment { contents } => Some(contents.to_string()),
        _ => None,
    }
}

/// 读取 `<head>` 中 `<meta>` 声明的字符集
///
/// 支持 `<meta charset>` 和 `<meta http-equiv="content-type" content="...; charset=...">` 两种写法。
pub fn get_charset(document: &Handle) -> Option<String> {
    let html = get_child_node_by_name(document, "html")?;
    let head = get_child_node_by_name(&html, "head")?;

    for meta in head.children.borrow().iter() {
        if get_node_name(meta) != Some("meta") {
            continue;
        }

        if let Some(charset) = get_node_attr(meta, "charset") {
            return Some(charset.trim().to_string());
        }

        if get_node_attr(meta, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            let content = get_node_attr(meta, "content").unwrap_or_default();
            let charset = content.split(';').skip(1).find_map(|param| {
                let (name, value) = param.split_once('=')?;
                name.trim()
                    .eq_ignore_ascii_case("charset")
                    .then(|| value.trim().trim_matches('"').to_string())
            });
            if charset.is_some() {
                return charset;
            }
        }
    }

    None
}
