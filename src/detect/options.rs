use serde::{Deserialize, Serialize};

/// 语言检测的数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum DetectSource {
    #[serde(rename = "querystring")]
    QueryString,
    #[serde(rename = "cookie")]
    Cookie,
    #[serde(rename = "localStorage")]
    LocalStorage,
    #[serde(rename = "sessionStorage")]
    SessionStorage,
    #[serde(rename = "navigator")]
    Navigator,
    #[serde(rename = "htmlTag")]
    HtmlTag,
}

/// 保存所选语言的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CacheTarget {
    #[serde(rename = "querystring")]
    QueryString,
    #[serde(rename = "cookie")]
    Cookie,
    #[serde(rename = "localStorage")]
    LocalStorage,
    #[serde(rename = "sessionStorage")]
    SessionStorage,
}

/// 检测与持久化选项
///
/// 反序列化时缺省字段取默认值，因此配置文件只需写出要覆盖的部分。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectOptions {
    pub order: Vec<DetectSource>,
    pub lookup_querystring: String,
    pub lookup_cookie: String,
    pub lookup_local_storage: String,
    pub lookup_session_storage: String,
    pub caches: Vec<CacheTarget>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            order: vec![
                DetectSource::QueryString,
                DetectSource::Cookie,
                DetectSource::LocalStorage,
                DetectSource::SessionStorage,
                DetectSource::Navigator,
                DetectSource::HtmlTag,
            ],
            lookup_querystring: "lng".to_string(),
            lookup_cookie: "i18n_dom".to_string(),
            lookup_local_storage: "i18nDOMLng".to_string(),
            lookup_session_storage: "i18nDOMLng".to_string(),
            caches: vec![CacheTarget::LocalStorage],
        }
    }
}
