//! 指令（宏）语法解析器
//!
//! 文本节点或紧随其后的注释节点中可以嵌入指令，形如：
//!
//! ```text
//! Hello I18N_D name=World I18N_K greeting
//! ```
//!
//! 每条指令由空白字符开头，接标记前缀 `I18N` 或 `I18NDOM`、下划线、
//! 指令类型（`KEY`/`K`、`DATA`/`D`、`IGNORE`/`I`）、一个空白字符，
//! 然后是负载内容，负载一直延伸到下一个标记或字符串结尾。
//!
//! 本模块只做纯函数解析，不接触文档树。

use std::sync::OnceLock;

use regex::Regex;

/// 标记关键字，负载在遇到它之前结束
const MARKER: &str = "I18N";

/// 指令头：空白 + 前缀 + `_` + 类型 + 空白
fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s(I18NDOM|I18N)_(\S+)\s").unwrap())
}

/// 独立的忽略标记，可以没有负载
fn ignore_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s(?:I18NDOM|I18N)_(?:IGNORE|I)(?:\s|$)").unwrap())
}

/// 任意标记前缀
fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s(?:I18NDOM_|I18N_)").unwrap())
}

/// 指令类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// 追加到查找键上的消歧后缀
    Key,
    /// `name=value` 形式的动态数据
    Data,
    /// 整个节点不参与翻译
    Ignore,
}

impl DirectiveKind {
    /// 根据指令头中的类型标签识别指令
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "KEY" | "K" => Some(DirectiveKind::Key),
            "DATA" | "D" => Some(DirectiveKind::Data),
            "IGNORE" | "I" => Some(DirectiveKind::Ignore),
            _ => None,
        }
    }
}

/// 一条 DATA 指令携带的数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPair {
    pub name: String,
    pub value: String,
}

impl DataPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// 查找前替换进文本的占位符 `%name%`
    pub fn placeholder(&self) -> String {
        format!("%{}%", self.name)
    }
}

/// 一次解析的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub has_directives: bool,
    pub is_ignored: bool,
    /// 第一条指令（含忽略标记）在原文中的字节偏移
    pub start_offset: Option<usize>,
    pub data_pairs: Vec<DataPair>,
    /// 所有 KEY 指令完整匹配文本的拼接
    pub key_suffix: String,
}

impl Directives {
    /// 去掉指令后的可读文本
    pub fn base_text<'a>(&self, text: &'a str) -> &'a str {
        match self.start_offset {
            Some(offset) => &text[..offset],
            None => text,
        }
    }

    /// 从第一条指令开始的尾部，也就是要移入注释节点的内容
    pub fn directive_tail<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.start_offset.map(|offset| &text[offset..])
    }
}

/// 单条指令的匹配位置
#[derive(Debug, Clone, Copy)]
struct DirectiveMatch<'a> {
    start: usize,
    tag: &'a str,
    payload: &'a str,
    matched: &'a str,
}

/// 解析文本中的全部指令
pub fn parse_directives(text: &str) -> Directives {
    let matches = find_directives(text);
    let ignore_at = ignore_regex().find(text).map(|m| m.start());

    let is_ignored = ignore_at.is_some()
        || matches
            .iter()
            .any(|m| DirectiveKind::from_tag(m.tag) == Some(DirectiveKind::Ignore));
    let has_directives = !matches.is_empty() || is_ignored;

    let start_offset = matches
        .first()
        .map(|m| m.start)
        .into_iter()
        .chain(ignore_at)
        .min();

    let mut data_pairs = Vec::new();
    let mut key_suffix = String::new();

    for directive in &matches {
        match DirectiveKind::from_tag(directive.tag) {
            Some(DirectiveKind::Key) => key_suffix.push_str(directive.matched),
            Some(DirectiveKind::Data) => match parse_data_payload(directive.payload) {
                Some(pair) => data_pairs.push(pair),
                None => tracing::warn!(
                    payload = directive.payload,
                    "DATA directive without name=value, skipped"
                ),
            },
            Some(DirectiveKind::Ignore) => {}
            None => tracing::debug!(tag = directive.tag, "unknown directive tag"),
        }
    }

    Directives {
        has_directives,
        is_ignored,
        start_offset,
        data_pairs,
        key_suffix,
    }
}

/// 文本中是否出现任何指令标记
pub fn has_directive_marker(text: &str) -> bool {
    marker_regex().is_match(text)
}

/// 截掉第一个标记及其后的全部内容
pub fn strip_directives(text: &str) -> &str {
    match marker_regex().find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// 依次查找指令，互不重叠
fn find_directives(text: &str) -> Vec<DirectiveMatch<'_>> {
    let mut found = Vec::new();
    let mut search_from = 0;

    while search_from < text.len() {
        let Some(caps) = header_regex().captures_at(text, search_from) else {
            break;
        };
        // 捕获组 0 和 2 在匹配成功时一定存在
        let (Some(header), Some(tag)) = (caps.get(0), caps.get(2)) else {
            break;
        };

        let payload_end = scan_payload(text, header.end());
        if payload_end == header.end() {
            // 负载为空时该位置不构成指令，从下一个字符继续
            search_from = next_char_boundary(text, header.start());
            continue;
        }

        found.push(DirectiveMatch {
            start: header.start(),
            tag: tag.as_str(),
            payload: &text[header.end()..payload_end],
            matched: &text[header.start()..payload_end],
        });
        search_from = payload_end;
    }

    found
}

/// 负载逐字符延伸：遇到换行停止，某字符之后紧跟标记时该字符不计入
fn scan_payload(text: &str, from: usize) -> usize {
    let mut end = from;

    for (offset, c) in text[from..].char_indices() {
        if matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
            break;
        }
        let next = from + offset + c.len_utf8();
        if text[next..].starts_with(MARKER) {
            break;
        }
        end = next;
    }

    end
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}

/// 按第一个 `=` 拆分名称与值，值可以包含更多 `=`
fn parse_data_payload(payload: &str) -> Option<DataPair> {
    let (name, value) = payload.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(DataPair::new(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_has_no_directives() {
        let parsed = parse_directives("Hello world");
        assert_eq!(parsed, Directives::default());
        assert_eq!(parsed.base_text("Hello world"), "Hello world");
        assert!(parsed.directive_tail("Hello world").is_none());
    }

    #[test]
    fn test_data_directive() {
        let text = "Hello I18N_D name=World";
        let parsed = parse_directives(text);

        assert!(parsed.has_directives);
        assert!(!parsed.is_ignored);
        assert_eq!(parsed.start_offset, Some(5));
        assert_eq!(parsed.data_pairs, vec![DataPair::new("name", "World")]);
        assert_eq!(parsed.key_suffix, "");
        assert_eq!(parsed.base_text(text), "Hello");
        assert_eq!(parsed.directive_tail(text), Some(" I18N_D name=World"));
    }

    #[test]
    fn test_data_value_keeps_extra_equals() {
        let parsed = parse_directives("Query I18NDOM_DATA q=a=b");
        assert_eq!(parsed.data_pairs, vec![DataPair::new("q", "a=b")]);
    }

    #[test]
    fn test_key_suffix_is_full_match() {
        let text = "Open I18N_K menu I18NDOM_KEY verb";
        let parsed = parse_directives(text);

        assert_eq!(parsed.key_suffix, " I18N_K menu I18NDOM_KEY verb");
        assert_eq!(parsed.base_text(text), "Open");
    }

    #[test]
    fn test_payload_stops_before_next_marker() {
        let parsed = parse_directives("Hi I18N_D who=Ann I18N_K casual");

        assert_eq!(parsed.data_pairs, vec![DataPair::new("who", "Ann")]);
        assert_eq!(parsed.key_suffix, " I18N_K casual");
    }

    #[test]
    fn test_multiple_data_pairs_in_order() {
        let parsed = parse_directives("%a% and %b% I18N_D a=1 I18N_D b=2");
        assert_eq!(
            parsed.data_pairs,
            vec![DataPair::new("a", "1"), DataPair::new("b", "2")]
        );
    }

    #[test]
    fn test_standalone_ignore() {
        let text = "Brand I18N_I";
        let parsed = parse_directives(text);

        assert!(parsed.has_directives);
        assert!(parsed.is_ignored);
        assert_eq!(parsed.start_offset, Some(5));
        assert_eq!(parsed.base_text(text), "Brand");
    }

    #[test]
    fn test_ignore_before_other_directives() {
        let text = "Logo I18NDOM_IGNORE brand I18N_D v=2";
        let parsed = parse_directives(text);

        assert!(parsed.is_ignored);
        assert_eq!(parsed.start_offset, Some(4));
        assert_eq!(parsed.data_pairs, vec![DataPair::new("v", "2")]);
    }

    #[test]
    fn test_directive_right_after_header_is_payload() {
        // 指令头之后的空白已被消耗，紧随其后的标记属于负载
        let parsed = parse_directives("Logo I18N_I I18N_D v=2");

        assert!(parsed.is_ignored);
        assert!(parsed.data_pairs.is_empty());
    }

    #[test]
    fn test_ignore_requires_tag_boundary() {
        assert!(!parse_directives("x I18N_INFO").has_directives);
    }

    #[test]
    fn test_malformed_data_is_skipped() {
        let parsed = parse_directives("Hello I18N_D nothing");

        assert!(parsed.has_directives);
        assert!(parsed.data_pairs.is_empty());
        assert_eq!(parsed.start_offset, Some(5));
    }

    #[test]
    fn test_unknown_tag_still_marks_start() {
        let text = "Hello I18N_X stuff";
        let parsed = parse_directives(text);

        assert!(parsed.has_directives);
        assert_eq!(parsed.base_text(text), "Hello");
        assert!(parsed.key_suffix.is_empty());
    }

    #[test]
    fn test_marker_needs_leading_whitespace() {
        assert!(!parse_directives("I18N_K start").has_directives);
        assert!(!parse_directives("abcI18N_K x").has_directives);
    }

    #[test]
    fn test_empty_payload_is_not_directive() {
        assert!(!parse_directives("Hello I18N_K ").has_directives);
    }

    #[test]
    fn test_payload_stops_at_newline() {
        let parsed = parse_directives("Hi I18N_D n=1\nrest");
        assert_eq!(parsed.data_pairs, vec![DataPair::new("n", "1")]);
    }

    #[test]
    fn test_parsing_stripped_output_is_idempotent() {
        let samples = [
            "Hello I18N_D name=World",
            "Open I18N_K menu I18NDOM_KEY verb",
            "Brand I18N_I",
            "Logo I18NDOM_IGNORE brand I18N_D v=2",
            "plain",
            "Hi I18N_D who=Ann I18N_K casual",
            "multi  spaced   I18N_K k",
            "ünïcödé I18N_K ключ",
        ];

        for sample in samples {
            let parsed = parse_directives(sample);
            let stripped = parsed.base_text(sample);
            assert!(
                !parse_directives(stripped).has_directives,
                "stripped output of {:?} still has directives",
                sample
            );
        }
    }

    #[test]
    fn test_strip_directives() {
        assert_eq!(strip_directives("Hola I18N_K greeting"), "Hola");
        assert_eq!(strip_directives("Hola"), "Hola");
        assert!(has_directive_marker(" I18NDOM_D a=b"));
        assert!(!has_directive_marker("I18N_D a=b"));
    }

    #[test]
    fn test_directive_kind_tags() {
        assert_eq!(DirectiveKind::from_tag("K"), Some(DirectiveKind::Key));
        assert_eq!(DirectiveKind::from_tag("DATA"), Some(DirectiveKind::Data));
        assert_eq!(DirectiveKind::from_tag("IGNORE"), Some(DirectiveKind::Ignore));
        assert_eq!(DirectiveKind::from_tag("KEYS"), None);
        assert_eq!(DataPair::new("n", "v").placeholder(), "%n%");
    }
}
