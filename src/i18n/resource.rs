//! 资源表
//!
//! 语言代码到字符串序列的映射。不同语言之间只靠位置对应：
//! 同一下标上的字符串互为译文。构造完成后只读。

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use super::error::{helpers, I18nError, I18nResult};

#[derive(Debug, Clone, Default)]
struct LanguageEntries {
    strings: Vec<String>,
    /// 字符串到其第一次出现位置
    index: HashMap<String, usize>,
}

impl LanguageEntries {
    fn new(strings: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(strings.len());
        for (i, s) in strings.iter().enumerate() {
            index.entry(s.clone()).or_insert(i);
        }
        Self { strings, index }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    /// 插入顺序，决定“第一个语言”
    languages: Vec<String>,
    entries: HashMap<String, LanguageEntries>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一种语言；同名语言会被整体替换，但保留原来的顺序位置
    pub fn with_language<I, S>(mut self, language: impl Into<String>, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let language = language.into();
        let strings = strings.into_iter().map(Into::into).collect();

        if !self.entries.contains_key(&language) {
            self.languages.push(language.clone());
        }
        self.entries.insert(language, LanguageEntries::new(strings));
        self
    }

    /// 从 JSON 对象解析，形如 `{"en": ["Hello"], "es": ["Hola"]}`，保留键的顺序
    pub fn from_json_str(json: &str) -> I18nResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(helpers::resource_error("资源表必须是 JSON 对象"));
        };

        let mut table = Self::new();
        for (language, strings) in map {
            let Value::Array(items) = strings else {
                return Err(I18nError::ParseError(format!(
                    "语言 '{}' 的条目必须是字符串数组",
                    language
                )));
            };

            let mut collected = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::String(s) => collected.push(s),
                    other => {
                        return Err(I18nError::ParseError(format!(
                            "语言 '{}' 第 {} 项不是字符串: {}",
                            language, i, other
                        )))
                    }
                }
            }
            table = table.with_language(language, collected);
        }

        table.validate()?;
        Ok(table)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> I18nResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| I18nError::from(e).with_context(path.display()))?;
        Self::from_json_str(&content).map_err(|e| e.with_context(path.display()))
    }

    /// 表不能为空；各语言条目数不一致只记录警告
    pub fn validate(&self) -> I18nResult<()> {
        let Some(first) = self.languages.first() else {
            return Err(helpers::resource_error("资源表中没有任何语言"));
        };

        let expected = self.len_of(first);
        for language in &self.languages {
            let len = self.len_of(language);
            if len != expected {
                tracing::warn!(
                    language = %language,
                    len,
                    expected,
                    "resource sequences differ in length"
                );
            }
        }
        Ok(())
    }

    /// 语言代码，按插入顺序
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn first_language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }

    pub fn contains_language(&self, language: &str) -> bool {
        self.entries.contains_key(language)
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// `key` 在 `language` 序列中第一次出现的位置
    pub fn index_of(&self, language: &str, key: &str) -> Option<usize> {
        self.entries.get(language)?.index.get(key).copied()
    }

    pub fn get(&self, language: &str, index: usize) -> Option<&str> {
        self.entries
            .get(language)?
            .strings
            .get(index)
            .map(String::as_str)
    }

    pub fn strings(&self, language: &str) -> Option<&[String]> {
        self.entries.get(language).map(|e| e.strings.as_slice())
    }

    fn len_of(&self, language: &str) -> usize {
        self.entries.get(language).map_or(0, |e| e.strings.len())
    }
}
