// 集成测试公共模块
//
// 资源表、文档与引擎的构造辅助

use std::rc::Rc;

use i18n_dom::detect::{DetectOptions, Host, MemoryHost};
use i18n_dom::dom::Document;
use i18n_dom::i18n::{I18nDom, I18nOptions, ResourceTable};
use i18n_dom::parsers::html::{get_all_text_nodes, get_comment_content, get_text_content, next_sibling};
use markup5ever_rcdom::Handle;

/// 三种语言的示例资源表
pub fn sample_resource() -> ResourceTable {
    ResourceTable::new()
        .with_language(
            "en",
            [
                "Hello",
                "Save I18N_K menu",
                "Save I18N_K rescue",
                "Hello %name%",
                "Bye",
            ],
        )
        .with_language(
            "es",
            [
                "Hola",
                "Guardar I18N_K menu",
                "Rescatar I18N_K rescue",
                "Hola %name%",
                "Adiós",
            ],
        )
        .with_language(
            "fr",
            [
                "Bonjour",
                "Enregistrer I18N_K menu",
                "Sauver I18N_K rescue",
                "Bonjour %name%",
                "Au revoir",
            ],
        )
}

/// 挂载好的引擎以及它使用的文档和宿主
pub struct Fixture {
    pub document: Rc<Document>,
    pub host: Rc<MemoryHost>,
    pub engine: I18nDom,
}

impl Fixture {
    pub fn new(html: &str, language: &str) -> Self {
        Self::with_resource(html, language, sample_resource())
    }

    pub fn with_resource(html: &str, language: &str, resource: ResourceTable) -> Self {
        Self::build(
            html,
            Some(language),
            MemoryHost::new(),
            DetectOptions::default(),
            resource,
        )
    }

    pub fn with_host(
        html: &str,
        language: Option<&str>,
        host: MemoryHost,
        detection: DetectOptions,
    ) -> Self {
        Self::build(html, language, host, detection, sample_resource())
    }

    fn build(
        html: &str,
        language: Option<&str>,
        host: MemoryHost,
        detection: DetectOptions,
        resource: ResourceTable,
    ) -> Self {
        let document = Document::parse_html(html);
        let host = Rc::new(host);
        let options = I18nOptions {
            html_language: Some("en".to_string()),
            language: language.map(str::to_string),
            detection,
            ..I18nOptions::new(resource)
        };

        let shared: Rc<dyn Host> = host.clone();
        let engine = I18nDom::new(document.clone(), shared, options).unwrap();

        Self {
            document,
            host,
            engine,
        }
    }

    /// `<body>` 下全部文本节点的内容
    pub fn texts(&self) -> Vec<String> {
        text_nodes(&self.document)
            .iter()
            .filter_map(get_text_content)
            .collect()
    }

    pub fn text_node(&self, index: usize) -> Handle {
        text_nodes(&self.document)[index].clone()
    }
}

pub fn text_nodes(document: &Document) -> Vec<Handle> {
    get_all_text_nodes(&document.body())
}

/// 紧随文本节点之后的注释内容
pub fn carrier_of(node: &Handle) -> Option<String> {
    next_sibling(node).as_ref().and_then(get_comment_content)
}

/// 按位置取子元素
pub fn child(parent: &Handle, index: usize) -> Handle {
    parent.children.borrow()[index].clone()
}
