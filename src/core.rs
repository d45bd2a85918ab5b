//! 文档翻译流水线
//!
//! 解码 → 解析 → 挂载引擎完成首次翻译 → 序列化。命令行使用这里的函数，
//! 库使用者也可以直接调用。

use std::rc::Rc;

use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;

use crate::detect::{DetectOptions, Host, MemoryHost};
use crate::dom::Document;
use crate::i18n::config::constants::DEFAULT_ENCODING;
use crate::i18n::error::{helpers, I18nResult};
use crate::i18n::{I18nConfig, I18nDom, I18nOptions, PassStats, ResourceTable};
use crate::parsers::html::{get_charset, html_to_dom, serialize_document};

/// 单次翻译的选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub language: Option<String>,
    pub html_language: Option<String>,
    pub fallback_lng: Option<String>,
    /// 输入编码，文档内声明的字符集优先
    pub encoding: Option<String>,
    pub detection: DetectOptions,
}

impl From<&I18nConfig> for TranslateOptions {
    fn from(config: &I18nConfig) -> Self {
        Self {
            language: config.language.clone(),
            html_language: config.html_language.clone(),
            fallback_lng: config.fallback_lng.clone(),
            encoding: Some(config.encoding.clone()),
            detection: config.detection.clone(),
        }
    }
}

/// 翻译结果
#[derive(Debug, Clone)]
pub struct TranslateOutput {
    pub data: Vec<u8>,
    /// 实际使用的目标语言
    pub language: String,
    /// 文档原文语言
    pub html_language: String,
    pub encoding: String,
    pub stats: PassStats,
}

/// 校验编码名称
pub fn validate_encoding(encoding: &str) -> I18nResult<()> {
    if Encoding::for_label_no_replacement(encoding.as_bytes()).is_none() {
        return Err(helpers::config_error(format!(
            "unknown encoding \"{}\"",
            encoding
        )));
    }
    Ok(())
}

/// 解析文档，`<meta>` 中声明了有效字符集时按该字符集重新解码
pub fn parse_with_encoding(input: &[u8], encoding: &str) -> (RcDom, String) {
    let mut document_encoding = encoding.to_string();
    let mut dom = html_to_dom(input, document_encoding.clone());

    if let Some(html_charset) = get_charset(&dom.document) {
        if let Some(charset) = Encoding::for_label_no_replacement(html_charset.as_bytes()) {
            if !charset.name().eq_ignore_ascii_case(&document_encoding) {
                tracing::debug!(charset = %charset.name(), "re-decoding with declared charset");
                dom = html_to_dom(input, charset.name().to_string());
            }
            document_encoding = charset.name().to_string();
        }
    }

    (dom, document_encoding)
}

/// 翻译一份 HTML 文档
///
/// 引擎挂载在 `<body>` 上，宿主环境是空的 [`MemoryHost`]，
/// 未指定语言时检测结果来自 `<html lang>`。
pub fn translate_html(
    input: &[u8],
    resource: &ResourceTable,
    options: &TranslateOptions,
) -> I18nResult<TranslateOutput> {
    translate_html_with_host(input, resource, options, Rc::new(MemoryHost::new()))
}

/// 同 [`translate_html`]，使用调用方提供的宿主环境
pub fn translate_html_with_host(
    input: &[u8],
    resource: &ResourceTable,
    options: &TranslateOptions,
    host: Rc<dyn Host>,
) -> I18nResult<TranslateOutput> {
    let encoding = options.encoding.as_deref().unwrap_or(DEFAULT_ENCODING);
    validate_encoding(encoding)?;

    let (dom, document_encoding) = parse_with_encoding(input, encoding);
    let document = Document::new(dom);

    let engine = I18nDom::new(
        document.clone(),
        host,
        I18nOptions {
            attach_node: None,
            html_language: options.html_language.clone(),
            resource: resource.clone(),
            language: options.language.clone(),
            fallback_lng: options.fallback_lng.clone(),
            detection: options.detection.clone(),
        },
    )?;
    engine.stop_observe();

    let stats = engine.last_pass();
    tracing::info!(
        language = %engine.language(),
        translated = stats.translated,
        missed = stats.missed,
        ignored = stats.ignored,
        "document translated"
    );

    let data = serialize_document(document.root(), &document_encoding)?;

    Ok(TranslateOutput {
        data,
        language: engine.language(),
        html_language: engine.html_language().to_string(),
        encoding: document_encoding,
        stats,
    })
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 向 stderr 输出错误信息
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}
