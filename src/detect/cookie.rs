//! 内存中的 cookie 存储
//!
//! 行为参照 `document.cookie`：写入的是 `name=value; expires=...` 形式的字符串，
//! 读取得到的是所有未过期 cookie 以 `; ` 连接的字符串。

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use percent_encoding::percent_decode_str;

/// `Date.prototype.toUTCString` 的格式
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条 cookie 字符串，同名 cookie 被替换，已过期的被删除
    pub fn set_cookie_string(&mut self, cookie: &str, now: DateTime<Utc>) {
        let mut parts = cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            tracing::debug!(cookie, "ignoring cookie without name=value");
            return;
        };
        let name = name.trim().to_string();

        let expires = parts.find_map(|attr| {
            let (key, value) = attr.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("expires") {
                parse_expires(value.trim())
            } else {
                None
            }
        });

        self.cookies.retain(|c| c.name != name);
        if expires.is_some_and(|at| at <= now) {
            return;
        }
        self.cookies.push(Cookie {
            name,
            value: value.trim().to_string(),
            expires,
        });
    }

    /// 所有未过期 cookie，格式同 `document.cookie`
    pub fn cookie_string(&self, now: DateTime<Utc>) -> String {
        self.cookies
            .iter()
            .filter(|c| c.expires.map_or(true, |at| at > now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// 生成 `name=value; expires=...`，有效期为 `expires_days` 天
pub fn compose_cookie(name: &str, value: &str, expires_days: i64, now: DateTime<Utc>) -> String {
    let expires = now + Duration::days(expires_days);
    format!("{}={}; expires={}", name, value, expires.format(EXPIRES_FORMAT))
}

/// 从 cookie 字符串中按名称取值，整体先做百分号解码
pub fn get_cookie(cookie_string: &str, name: &str) -> Option<String> {
    let key = format!("{}=", name);
    let decoded = percent_decode_str(cookie_string).decode_utf8_lossy();

    decoded
        .split(';')
        .map(|cookie| cookie.trim_start_matches(' '))
        .find_map(|cookie| cookie.strip_prefix(key.as_str()).map(str::to_string))
}

fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, EXPIRES_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
