use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use lazy_static::lazy_static;

const COOKIE_NAME: &str = "lng";
const QUERY_PARAM: &str = "lng";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Es,
}

impl Locale {
    pub const FALLBACK: Locale = Locale::En;

    /// Match a language tag against the supported set. Only the primary
    /// subtag counts, so `es-MX` resolves to `Es`.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let primary = tag.trim().split('-').next().unwrap_or("");
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }
}

lazy_static! {
    static ref EN: HashMap<String, String> = parse_catalog(include_str!("../locales/en.json"));
    static ref ES: HashMap<String, String> = parse_catalog(include_str!("../locales/es.json"));
}

/// Flatten a nested JSON catalog into dotted keys ("error.invalid_email").
fn parse_catalog(raw: &str) -> HashMap<String, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).expect("embedded translation catalog is valid JSON");
    let mut out = HashMap::new();
    flatten("", &value, &mut out);
    out
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut HashMap<String, String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&key, v, out);
            }
        }
        serde_json::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        _ => {}
    }
}

/// Per-request message lookup. Resolved once per request and cheap to copy
/// around; unknown keys fall back to the key itself so localization can
/// never fail a request.
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    fn catalog(&self) -> &'static HashMap<String, String> {
        match self.locale {
            Locale::En => &EN,
            Locale::Es => &ES,
        }
    }

    pub fn t(&self, key: &str) -> String {
        self.catalog()
            .get(key)
            .or_else(|| EN.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Detection order: `?lng=` query parameter, then the `lng` cookie,
    /// then `Accept-Language`, then the fallback.
    pub fn resolve(parts: &Parts) -> Translator {
        Translator::new(detect(parts.uri.query(), &parts.headers))
    }
}

fn detect(query: Option<&str>, headers: &HeaderMap) -> Locale {
    if let Some(locale) = query.and_then(locale_from_query) {
        return locale;
    }
    let jar = CookieJar::from_headers(headers);
    if let Some(locale) = jar.get(COOKIE_NAME).and_then(|c| Locale::from_tag(c.value())) {
        return locale;
    }
    if let Some(locale) = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(locale_from_accept_language)
    {
        return locale;
    }
    Locale::FALLBACK
}

fn locale_from_query(query: &str) -> Option<Locale> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == QUERY_PARAM)
        .and_then(|(_, v)| Locale::from_tag(v))
}

/// First supported tag wins; q-weights are ignored.
fn locale_from_accept_language(value: &str) -> Option<Locale> {
    value
        .split(',')
        .filter_map(|part| part.split(';').next())
        .find_map(Locale::from_tag)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Translator
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Translator::resolve(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::header::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn query_parameter_wins_over_cookie_and_header() {
        let h = headers(&[
            ("cookie", "lng=en"),
            ("accept-language", "en-US,en;q=0.9"),
        ]);
        assert_eq!(detect(Some("lng=es"), &h), Locale::Es);
    }

    #[test]
    fn cookie_wins_over_header() {
        let h = headers(&[("cookie", "lng=es"), ("accept-language", "en-US")]);
        assert_eq!(detect(None, &h), Locale::Es);
    }

    #[test]
    fn accept_language_negotiates_first_supported_tag() {
        let h = headers(&[("accept-language", "fr-FR,es-MX;q=0.8,en;q=0.5")]);
        assert_eq!(detect(None, &h), Locale::Es);
    }

    #[test]
    fn falls_back_to_default_when_nothing_matches() {
        let h = headers(&[("accept-language", "de-DE,fr;q=0.9")]);
        assert_eq!(detect(None, &h), Locale::FALLBACK);
        assert_eq!(detect(None, &HeaderMap::new()), Locale::FALLBACK);
    }

    #[test]
    fn unsupported_query_value_falls_through() {
        let h = headers(&[("cookie", "lng=es")]);
        assert_eq!(detect(Some("lng=de"), &h), Locale::Es);
    }

    #[test]
    fn translate_uses_the_resolved_catalog() {
        let en = Translator::new(Locale::En);
        let es = Translator::new(Locale::Es);
        assert_ne!(en.t("error.invalid_credentials"), "error.invalid_credentials");
        assert_ne!(es.t("error.invalid_credentials"), en.t("error.invalid_credentials"));
    }

    #[test]
    fn unknown_key_fails_open() {
        let t = Translator::new(Locale::Es);
        assert_eq!(t.t("error.does_not_exist"), "error.does_not_exist");
    }
}
