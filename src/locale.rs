//! Locale negotiation: cookie first, then `Accept-Language`, then the default.
//!
//! The middleware mirrors what the frontend expects: the resolved locale is
//! written back as a site-wide `locale` cookie and forwarded downstream as an
//! `x-locale` request header. API and framework asset paths are left alone.

use axum::{
  extract::Request,
  http::{header::ACCEPT_LANGUAGE, HeaderName, HeaderValue},
  middleware::Next,
  response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

pub const SUPPORTED_LOCALES: [&str; 20] = [
  "en", "ko", "es", "ja", "de", "fr", "pt", "ru", "zh", "it",
  "ar", "hi", "id", "tr", "vi", "pl", "nl", "th", "sv", "ms",
];

pub const DEFAULT_LOCALE: &str = "en";
pub const LOCALE_COOKIE: &str = "locale";
pub const LOCALE_HEADER: &str = "x-locale";

/// Return the canonical supported code for `tag` ("ko", "zh-CN", "PT_br"), if any.
/// Exact matches win; otherwise the primary subtag is tried.
pub fn supported(tag: &str) -> Option<&'static str> {
  let tag = tag.trim().replace('_', "-").to_ascii_lowercase();
  if tag.is_empty() {
    return None;
  }
  if let Some(hit) = SUPPORTED_LOCALES.iter().find(|l| **l == tag) {
    return Some(*hit);
  }
  let primary = tag.split('-').next().unwrap_or_default();
  SUPPORTED_LOCALES.iter().find(|l| **l == primary).copied()
}

/// Parse an `Accept-Language` value into tags ordered by descending quality.
/// Entries with `q=0` or an unparsable weight are dropped; ties keep header order.
pub fn parse_accept_language(header: &str) -> Vec<String> {
  let mut weighted: Vec<(f32, usize, String)> = header
    .split(',')
    .enumerate()
    .filter_map(|(idx, part)| {
      let mut pieces = part.split(';');
      let tag = pieces.next()?.trim();
      if tag.is_empty() || tag == "*" {
        return None;
      }
      let mut q = 1.0f32;
      for param in pieces {
        if let Some(v) = param.trim().strip_prefix("q=") {
          q = v.trim().parse::<f32>().ok()?;
        }
      }
      (q > 0.0).then(|| (q, idx, tag.to_string()))
    })
    .collect();

  weighted.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
  weighted.into_iter().map(|(_, _, tag)| tag).collect()
}

/// Resolve the request locale from an optional cookie and `Accept-Language` header.
pub fn negotiate(cookie: Option<&str>, accept_language: Option<&str>) -> &'static str {
  if let Some(hit) = cookie.and_then(|c| SUPPORTED_LOCALES.iter().find(|l| **l == c).copied()) {
    return hit;
  }
  accept_language
    .map(parse_accept_language)
    .unwrap_or_default()
    .iter()
    .find_map(|tag| supported(tag))
    .unwrap_or(DEFAULT_LOCALE)
}

/// Locale for an API call: explicit body value, then cookie, then default.
pub fn resolve_request_locale(explicit: Option<&str>, jar: &CookieJar) -> &'static str {
  explicit
    .and_then(supported)
    .or_else(|| jar.get(LOCALE_COOKIE).and_then(|c| supported(c.value())))
    .unwrap_or(DEFAULT_LOCALE)
}

fn is_excluded_path(path: &str) -> bool {
  path.starts_with("/api") || path.starts_with("/_next") || path == "/favicon.ico"
}

/// Middleware for page routes. See module docs.
pub async fn locale_middleware(jar: CookieJar, mut request: Request, next: Next) -> Response {
  if is_excluded_path(request.uri().path()) {
    return next.run(request).await;
  }

  let accept = request
    .headers()
    .get(ACCEPT_LANGUAGE)
    .and_then(|v| v.to_str().ok())
    .map(str::to_string);
  let locale = negotiate(jar.get(LOCALE_COOKIE).map(|c| c.value()), accept.as_deref());
  debug!(target: "doomsday", %locale, path = %request.uri().path(), "Locale resolved");

  request
    .headers_mut()
    .insert(HeaderName::from_static(LOCALE_HEADER), HeaderValue::from_static(locale));

  let response = next.run(request).await;
  let jar = jar.add(Cookie::build((LOCALE_COOKIE, locale)).path("/"));
  (jar, response).into_response()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn twenty_locales_with_english_default() {
    assert_eq!(SUPPORTED_LOCALES.len(), 20);
    assert!(SUPPORTED_LOCALES.contains(&DEFAULT_LOCALE));
  }

  #[test]
  fn supported_matches_regional_variants() {
    assert_eq!(supported("zh-CN"), Some("zh"));
    assert_eq!(supported("pt_BR"), Some("pt"));
    assert_eq!(supported("KO"), Some("ko"));
    assert_eq!(supported("xx"), None);
    assert_eq!(supported(""), None);
  }

  #[test]
  fn accept_language_is_ordered_by_quality() {
    let tags = parse_accept_language("fr;q=0.5, de-DE, en;q=0.9, *;q=0.1, xx;q=0");
    assert_eq!(tags, vec!["de-DE", "en", "fr"]);
  }

  #[test]
  fn cookie_wins_when_supported() {
    assert_eq!(negotiate(Some("ja"), Some("de")), "ja");
    assert_eq!(negotiate(Some("klingon"), Some("de-AT,de;q=0.9")), "de");
  }

  #[test]
  fn falls_back_to_default() {
    assert_eq!(negotiate(None, None), "en");
    assert_eq!(negotiate(None, Some("xx-YY, yy")), "en");
  }

  #[test]
  fn api_and_asset_paths_are_excluded() {
    assert!(is_excluded_path("/api/generate-result"));
    assert!(is_excluded_path("/_next/static/app.js"));
    assert!(is_excluded_path("/favicon.ico"));
    assert!(!is_excluded_path("/test"));
  }
}
