//! 宿主环境的客户端存储
//!
//! 引擎只通过 [`Host`] 访问查询串、cookie、本地/会话存储和浏览器语言，
//! [`MemoryHost`] 是完全位于内存中的实现，用于命令行和测试。

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::Utc;
use url::Url;

use super::cookie::{compose_cookie, get_cookie, CookieJar};

/// 键值存储，对应 `localStorage` / `sessionStorage`
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// 语言检测与持久化所需的宿主能力
pub trait Host {
    fn query_param(&self, name: &str) -> Option<String>;
    fn set_query_param(&self, name: &str, value: &str);
    fn cookie(&self, name: &str) -> Option<String>;
    fn set_cookie(&self, name: &str, value: &str, expires_days: i64);
    fn local_storage(&self) -> &dyn Storage;
    fn session_storage(&self) -> &dyn Storage;
    fn navigator_language(&self) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// 内存宿主
#[derive(Debug)]
pub struct MemoryHost {
    location: RefCell<Url>,
    cookies: RefCell<CookieJar>,
    local_storage: MemoryStorage,
    session_storage: MemoryStorage,
    navigator_language: Option<String>,
}

impl MemoryHost {
    pub const DEFAULT_LOCATION: &'static str = "http://localhost/";

    pub fn new() -> Self {
        Self::with_location(Self::default_location())
    }

    pub fn with_location(location: Url) -> Self {
        Self {
            location: RefCell::new(location),
            cookies: RefCell::new(CookieJar::new()),
            local_storage: MemoryStorage::new(),
            session_storage: MemoryStorage::new(),
            navigator_language: None,
        }
    }

    pub fn with_navigator_language(mut self, language: impl Into<String>) -> Self {
        self.navigator_language = Some(language.into());
        self
    }

    /// 当前地址
    pub fn location(&self) -> Url {
        self.location.borrow().clone()
    }

    /// 相当于读取 `document.cookie`
    pub fn cookie_string(&self) -> String {
        self.cookies.borrow().cookie_string(Utc::now())
    }

    /// 相当于写入 `document.cookie`
    pub fn write_cookie_string(&self, cookie: &str) {
        self.cookies
            .borrow_mut()
            .set_cookie_string(cookie, Utc::now());
    }

    fn default_location() -> Url {
        // 常量地址，解析不会失败
        Url::parse(Self::DEFAULT_LOCATION).unwrap()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    fn query_param(&self, name: &str) -> Option<String> {
        self.location
            .borrow()
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// 语义同 `URLSearchParams.set`：替换第一个同名参数并删除其余同名参数
    fn set_query_param(&self, name: &str, value: &str) {
        let mut location = self.location.borrow_mut();

        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut replaced = false;
        for (key, current) in location.query_pairs() {
            if key == name {
                if !replaced {
                    pairs.push((key.into_owned(), value.to_string()));
                    replaced = true;
                }
            } else {
                pairs.push((key.into_owned(), current.into_owned()));
            }
        }
        if !replaced {
            pairs.push((name.to_string(), value.to_string()));
        }

        location.query_pairs_mut().clear().extend_pairs(pairs);
    }

    fn cookie(&self, name: &str) -> Option<String> {
        get_cookie(&self.cookie_string(), name)
    }

    fn set_cookie(&self, name: &str, value: &str, expires_days: i64) {
        let cookie = compose_cookie(name, value, expires_days, Utc::now());
        self.write_cookie_string(&cookie);
    }

    fn local_storage(&self) -> &dyn Storage {
        &self.local_storage
    }

    fn session_storage(&self) -> &dyn Storage {
        &self.session_storage
    }

    fn navigator_language(&self) -> Option<String> {
        self.navigator_language.clone()
    }
}
