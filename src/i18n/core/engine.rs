//! 翻译引擎
//!
//! 引擎挂载在文档的某个子树上：构造时先对整棵子树做一次翻译，
//! 然后安装文本观察器和结构观察器，让之后插入或修改的文本保持同步。
//! 切换语言时以当前语言为源语言重新翻译整棵子树。
//!
//! 所有写入都在 [`SuspendGuard`](super::guard::SuspendGuard) 的作用域内完成，
//! 引擎自己的修改不会再次触发自己的观察器。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use markup5ever_rcdom::{Handle, NodeData};

use super::guard::Observers;
use crate::detect::{get_default_language, save_selected_language, DetectOptions, Host};
use crate::dom::{Document, MutationKind, MutationObserver, MutationRecord};
use crate::i18n::config::constants::DEFAULT_HTML_LANGUAGE;
use crate::i18n::error::{helpers, I18nError, I18nResult};
use crate::i18n::resource::ResourceTable;
use crate::parsers::html::{
    get_all_text_nodes, get_comment_content, get_text_content, is_inclusive_ancestor, next_sibling,
};
use crate::parsers::macros::{has_directive_marker, parse_directives, strip_directives, Directives};

/// 构造参数
#[derive(Clone, Default)]
pub struct I18nOptions {
    /// 观察的子树根，默认 `<body>`
    pub attach_node: Option<Handle>,
    /// 文档原文所用语言，默认 `<html lang>`，再退回 `"en"`
    pub html_language: Option<String>,
    pub resource: ResourceTable,
    /// 初始目标语言，默认由检测得到
    pub language: Option<String>,
    /// 请求的语言不在资源表中时使用，默认资源表中的第一个语言
    pub fallback_lng: Option<String>,
    pub detection: DetectOptions,
}

impl I18nOptions {
    pub fn new(resource: ResourceTable) -> Self {
        Self {
            resource,
            ..Default::default()
        }
    }
}

/// 单个文本节点的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOutcome {
    /// 在源语言序列中找到并替换为目标语言
    Translated,
    /// 未找到，保留原文
    Missed,
    /// 带有忽略指令，保留原文
    Ignored,
}

/// 一次整树翻译的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub visited: usize,
    pub translated: usize,
    pub missed: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl PassStats {
    fn record(&mut self, outcome: TextOutcome) {
        match outcome {
            TextOutcome::Translated => self.translated += 1,
            TextOutcome::Missed => self.missed += 1,
            TextOutcome::Ignored => self.ignored += 1,
        }
    }
}

/// 引擎运行计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// 文本观察器回调次数
    pub text_callbacks: usize,
    /// 结构观察器回调次数
    pub node_callbacks: usize,
    /// 整树翻译次数
    pub passes: usize,
}

struct EngineInner {
    document: Rc<Document>,
    host: Rc<dyn Host>,
    attach_node: Handle,
    html_language: String,
    resource: ResourceTable,
    fallback_lng: Option<String>,
    detect_options: DetectOptions,
    language: RefCell<String>,
    observers: Observers,
    text_callbacks: Cell<usize>,
    node_callbacks: Cell<usize>,
    passes: Cell<usize>,
    last_pass: Cell<PassStats>,
}

/// 翻译引擎句柄，克隆后共享同一个引擎
#[derive(Clone)]
pub struct I18nDom {
    inner: Rc<EngineInner>,
}

impl I18nDom {
    /// 创建引擎，完成首次整树翻译并开始观察
    pub fn new(
        document: Rc<Document>,
        host: Rc<dyn Host>,
        options: I18nOptions,
    ) -> I18nResult<Self> {
        let I18nOptions {
            attach_node,
            html_language,
            resource,
            language,
            fallback_lng,
            detection,
        } = options;

        resource.validate()?;

        let attach_node = attach_node.unwrap_or_else(|| document.body());
        let html_language = html_language
            .filter(|lang| !lang.is_empty())
            .or_else(|| document.html_lang())
            .unwrap_or_else(|| DEFAULT_HTML_LANGUAGE.to_string());

        let fallback_lng = match fallback_lng {
            Some(lang) if !resource.contains_language(&lang) => {
                tracing::warn!(%lang, "fallback language not in resource table, using first language");
                None
            }
            other => other,
        };

        let requested = language
            .filter(|lang| !lang.is_empty())
            .or_else(|| get_default_language(host.as_ref(), &document, &detection))
            .unwrap_or_default();

        let inner = Rc::new_cyclic(|engine: &Weak<EngineInner>| {
            let text_engine = engine.clone();
            let text = MutationObserver::new(&document, move |records: &[MutationRecord]| {
                if let Some(engine) = text_engine.upgrade() {
                    engine.on_text_mutations(records);
                }
            });

            let node_engine = engine.clone();
            let node = MutationObserver::new(&document, move |records: &[MutationRecord]| {
                if let Some(engine) = node_engine.upgrade() {
                    engine.on_node_mutations(records);
                }
            });

            EngineInner {
                observers: Observers::new(attach_node.clone(), text, node),
                document,
                host,
                attach_node,
                html_language,
                resource,
                fallback_lng,
                detect_options: detection,
                language: RefCell::new(String::new()),
                text_callbacks: Cell::new(0),
                node_callbacks: Cell::new(0),
                passes: Cell::new(0),
                last_pass: Cell::new(PassStats::default()),
            }
        });

        inner.set_language(&requested, false);
        tracing::info!(
            html_language = %inner.html_language,
            language = %inner.language.borrow(),
            "i18n engine attached"
        );

        {
            let _guard = inner.observers.suspend();
            inner.translate_tree(&inner.attach_node, &inner.html_language);
        }

        let engine = Self { inner };
        engine.start_observe();
        Ok(engine)
    }

    pub fn start_text_observe(&self) {
        self.inner.observers.start_text();
    }

    pub fn stop_text_observe(&self) {
        self.inner.observers.stop_text();
    }

    pub fn start_node_observe(&self) {
        self.inner.observers.start_node();
    }

    pub fn stop_node_observe(&self) {
        self.inner.observers.stop_node();
    }

    pub fn start_observe(&self) {
        self.start_text_observe();
        self.start_node_observe();
    }

    pub fn stop_observe(&self) {
        self.stop_text_observe();
        self.stop_node_observe();
    }

    /// 两个观察器是否都在工作
    pub fn is_observing(&self) -> bool {
        self.inner.observers.is_text_observing() && self.inner.observers.is_node_observing()
    }

    /// 切换目标语言并重新翻译整棵子树
    ///
    /// 当前文档中的文本是旧目标语言，因此以旧目标语言作为这一次的源语言。
    pub fn change_language(&self, language: &str) -> PassStats {
        let inner = &self.inner;
        let original_language = inner.language.borrow().clone();

        if language == original_language || inner.resolve_language(language) == original_language
        {
            tracing::debug!(%language, "language unchanged");
            return PassStats::default();
        }

        inner.set_language(language, true);
        tracing::info!(
            from = %original_language,
            to = %inner.language.borrow(),
            "changing language"
        );

        let _guard = inner.observers.suspend();
        inner.translate_tree(&inner.attach_node, &original_language)
    }

    /// 设置目标语言；不在资源表中时使用回退语言。`persist` 为真时写入配置的存储
    pub fn set_language(&self, language: &str, persist: bool) -> String {
        self.inner.set_language(language, persist)
    }

    /// 翻译单个文本节点，`source_language` 是节点当前内容所用的语言
    pub fn translate_text_node(
        &self,
        node: &Handle,
        source_language: &str,
    ) -> I18nResult<TextOutcome> {
        let _guard = self.inner.observers.suspend();
        self.inner.translate_text(node, source_language)
    }

    /// 翻译 `root` 之下的全部文本节点
    pub fn translate_node_tree(&self, root: &Handle, source_language: &str) -> PassStats {
        let _guard = self.inner.observers.suspend();
        self.inner.translate_tree(root, source_language)
    }

    pub fn language(&self) -> String {
        self.inner.language.borrow().clone()
    }

    pub fn html_language(&self) -> &str {
        &self.inner.html_language
    }

    pub fn attach_node(&self) -> &Handle {
        &self.inner.attach_node
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.inner.document
    }

    pub fn resource(&self) -> &ResourceTable {
        &self.inner.resource
    }

    pub fn detect_options(&self) -> &DetectOptions {
        &self.inner.detect_options
    }

    /// 最近一次整树翻译的统计
    pub fn last_pass(&self) -> PassStats {
        self.inner.last_pass.get()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            text_callbacks: self.inner.text_callbacks.get(),
            node_callbacks: self.inner.node_callbacks.get(),
            passes: self.inner.passes.get(),
        }
    }
}

impl EngineInner {
    fn resolve_language(&self, language: &str) -> String {
        if self.resource.contains_language(language) {
            return language.to_string();
        }
        self.fallback_lng
            .as_deref()
            .or_else(|| self.resource.first_language())
            .unwrap_or_default()
            .to_string()
    }

    fn set_language(&self, language: &str, persist: bool) -> String {
        let resolved = self.resolve_language(language);
        if resolved != language {
            tracing::debug!(requested = %language, %resolved, "language not in resource table");
        }

        *self.language.borrow_mut() = resolved.clone();
        if persist {
            save_selected_language(self.host.as_ref(), &resolved, &self.detect_options);
        }
        resolved
    }

    fn on_text_mutations(&self, records: &[MutationRecord]) {
        self.text_callbacks.set(self.text_callbacks.get() + 1);
        let _guard = self.observers.suspend();

        for record in records {
            if record.kind != MutationKind::CharacterData {
                continue;
            }
            if !is_inclusive_ancestor(&self.attach_node, &record.target) {
                tracing::debug!("edited text node left the attached subtree, skipped");
                continue;
            }
            if let Err(e) = self.translate_text(&record.target, &self.html_language) {
                helpers::log_error(&e);
            }
        }
    }

    fn on_node_mutations(&self, records: &[MutationRecord]) {
        self.node_callbacks.set(self.node_callbacks.get() + 1);
        let _guard = self.observers.suspend();

        for record in records {
            for node in &record.added_nodes {
                // 同一批记录中先插入后移除的节点
                if !is_inclusive_ancestor(&self.attach_node, node) {
                    continue;
                }
                if let NodeData::Text { .. } = node.data {
                    if let Err(e) = self.translate_text(node, &self.html_language) {
                        helpers::log_error(&e);
                    }
                } else {
                    self.translate_tree(node, &self.html_language);
                }
            }
        }
    }

    fn translate_tree(&self, root: &Handle, source_language: &str) -> PassStats {
        let mut stats = PassStats::default();

        for node in get_all_text_nodes(root) {
            stats.visited += 1;
            match self.translate_text(&node, source_language) {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    stats.failed += 1;
                    helpers::log_error(&e);
                }
            }
        }

        self.passes.set(self.passes.get() + 1);
        self.last_pass.set(stats);
        tracing::debug!(
            source = %source_language,
            target = %self.language.borrow(),
            ?stats,
            "translation pass finished"
        );
        stats
    }

    fn translate_text(&self, node: &Handle, source_language: &str) -> I18nResult<TextOutcome> {
        let original_text = get_text_content(node).ok_or(I18nError::NotTextNode)?;

        let carrier = next_sibling(node).filter(|sibling| {
            get_comment_content(sibling).is_some_and(|comment| has_directive_marker(&comment))
        });

        let inline = parse_directives(&original_text);
        let (lookup_key, directives, directive_tail) = if inline.has_directives {
            let key = format!("{}{}", inline.base_text(&original_text), inline.key_suffix);
            let tail = inline.directive_tail(&original_text).map(str::to_string);
            (key, inline, tail)
        } else if let Some(comment) = carrier.as_ref().and_then(get_comment_content) {
            let parsed = parse_directives(&comment);
            let mut key = original_text.clone();
            for pair in parsed.data_pairs.iter().filter(|pair| !pair.value.is_empty()) {
                key = key.replace(&pair.value, &pair.placeholder());
            }
            key.push_str(&parsed.key_suffix);
            (key, parsed, None)
        } else {
            (original_text.clone(), Directives::default(), None)
        };

        let (mut result, outcome) = if directives.is_ignored {
            (strip_directives(&lookup_key).to_string(), TextOutcome::Ignored)
        } else {
            match self.lookup(source_language, &lookup_key) {
                Some(translated) => (strip_directives(translated).to_string(), TextOutcome::Translated),
                None => (strip_directives(&lookup_key).to_string(), TextOutcome::Missed),
            }
        };

        for pair in &directives.data_pairs {
            result = result.replace(&pair.placeholder(), &pair.value);
        }

        if result != original_text {
            self.document.set_text(node, &result);
        }

        if let Some(tail) = directive_tail {
            let comment = self.document.create_comment(&tail);
            let placed = match &carrier {
                Some(previous) => self.document.replace_with(previous, &comment),
                None => self.document.insert_after(node, &comment),
            };
            if !placed {
                tracing::debug!("text node has no parent, directives not moved to a comment");
            }
        }

        tracing::trace!(key = %lookup_key, ?outcome, "text node processed");
        Ok(outcome)
    }

    /// 源语言中的位置映射到目标语言的同一位置
    fn lookup(&self, source_language: &str, key: &str) -> Option<&str> {
        let index = self.resource.index_of(source_language, key)?;
        let language = self.language.borrow();

        let translated = self.resource.get(&language, index);
        if translated.is_none() {
            tracing::warn!(
                language = %language,
                index,
                "target sequence shorter than source, keeping original text"
            );
        }
        translated
    }
}
