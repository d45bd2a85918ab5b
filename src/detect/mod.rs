//! # 语言检测与持久化
//!
//! - `options` - 检测顺序、各存储使用的键名、保存位置
//! - `host` - 宿主存储接口及内存实现
//! - `cookie` - `document.cookie` 风格的 cookie 存储
//!
//! 检测按 `order` 依次查询，返回第一个非空结果；保存时写入 `caches`
//! 中列出的每一个位置。

pub mod cookie;
pub mod host;
pub mod options;

pub use cookie::CookieJar;
pub use host::{Host, MemoryHost, MemoryStorage, Storage};
pub use options::{CacheTarget, DetectOptions, DetectSource};

use crate::dom::Document;

/// 写入 cookie 时的有效天数
pub const COOKIE_EXPIRES_DAYS: i64 = 30;

/// 按检测顺序查找用户语言
pub fn get_default_language(
    host: &dyn Host,
    document: &Document,
    options: &DetectOptions,
) -> Option<String> {
    options.order.iter().find_map(|source| {
        let language = match source {
            DetectSource::QueryString => host.query_param(&options.lookup_querystring),
            DetectSource::Cookie => host.cookie(&options.lookup_cookie),
            DetectSource::LocalStorage => {
                host.local_storage().get_item(&options.lookup_local_storage)
            }
            DetectSource::SessionStorage => host
                .session_storage()
                .get_item(&options.lookup_session_storage),
            DetectSource::Navigator => host.navigator_language(),
            DetectSource::HtmlTag => document.html_lang(),
        };

        let language = language.filter(|lang| !lang.is_empty())?;
        tracing::debug!(?source, %language, "language detected");
        Some(language)
    })
}

/// 把所选语言写入配置的每个存储位置
pub fn save_selected_language(host: &dyn Host, language: &str, options: &DetectOptions) {
    for target in &options.caches {
        match target {
            CacheTarget::LocalStorage => host
                .local_storage()
                .set_item(&options.lookup_local_storage, language),
            CacheTarget::SessionStorage => host
                .session_storage()
                .set_item(&options.lookup_session_storage, language),
            CacheTarget::Cookie => {
                host.set_cookie(&options.lookup_cookie, language, COOKIE_EXPIRES_DAYS)
            }
            CacheTarget::QueryString => host.set_query_param(&options.lookup_querystring, language),
        }
    }
}
