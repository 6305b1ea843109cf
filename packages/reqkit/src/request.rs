//! The request descriptor handed to a transport.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Extensions, HeaderMap};
use url::Url;

use crate::error::Error;
use crate::options::Options;
use crate::types::Method;

/// A fully resolved request, built fresh for every attempt.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub extensions: Extensions,
}

impl Request {
    /// Build the descriptor for `input` under `options`.
    pub fn build(input: &str, options: &Options) -> Result<Self, Error> {
        let url = resolve_url(input, options)?;
        let mut headers = options.headers.to_header_map()?;

        let body = match &options.json {
            Some(json) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Some(Bytes::from(serde_json::to_vec(json)?))
            }
            None => options.body.clone(),
        };

        Ok(Self {
            method: options.method.unwrap_or_default(),
            url,
            headers,
            body,
            extensions: options.extensions.clone(),
        })
    }
}

/// Resolve `input` against the prefix URL and append the serialized params.
///
/// Absolute `http`/`https` inputs ignore the prefix. Otherwise the prefix
/// and input are joined with exactly one `/`. Params are appended to any
/// query already present in `input`. URLs with any other scheme are
/// rejected with [`Error::InvalidUrl`].
pub fn resolve_url(input: &str, options: &Options) -> Result<Url, Error> {
    let joined = match options.prefix_url.as_deref() {
        Some(prefix) if !is_absolute(input) => join(prefix, input),
        _ => input.to_string(),
    };

    let mut url = Url::parse(&joined)?;
    if !is_http(&url) {
        return Err(Error::InvalidUrl {
            message: format!("unsupported scheme `{}` in {}", url.scheme(), url),
        });
    }

    let query = match &options.serializer {
        Some(serializer) => serializer.serialize(&options.params),
        None => reqkit_query::serialize(&options.params),
    };

    if !query.is_empty() {
        let combined = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
            _ => query,
        };
        url.set_query(Some(&combined));
    }

    Ok(url)
}

fn is_absolute(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| is_http(&url))
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn join(prefix: &str, input: &str) -> String {
    if input.is_empty() {
        return prefix.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        input.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqkit_query::{Brackets, Params};
    use serde_json::json;

    #[test]
    fn prefix_is_joined_with_one_slash() {
        for (prefix, input) in [
            ("http://api.test/v1", "users"),
            ("http://api.test/v1/", "users"),
            ("http://api.test/v1", "/users"),
            ("http://api.test/v1/", "/users"),
        ] {
            let options = Options::new().prefix_url(prefix);
            let url = resolve_url(input, &options).unwrap();
            assert_eq!(url.as_str(), "http://api.test/v1/users");
        }
    }

    #[test]
    fn empty_input_uses_prefix() {
        let options = Options::new().prefix_url("http://api.test/v1");
        let url = resolve_url("", &options).unwrap();
        assert_eq!(url.as_str(), "http://api.test/v1");
    }

    #[test]
    fn absolute_input_ignores_prefix() {
        let options = Options::new().prefix_url("http://api.test/v1");
        let url = resolve_url("https://other.test/x", &options).unwrap();
        assert_eq!(url.as_str(), "https://other.test/x");
    }

    #[test]
    fn absolute_input_scheme_is_case_insensitive() {
        let options = Options::new().prefix_url("http://api.test/v1");
        let url = resolve_url("HTTPS://Other.test/x", &options).unwrap();
        assert_eq!(url.as_str(), "https://other.test/x");
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let result = resolve_url("ftp://files.test/report.csv", &Options::new());
        assert!(matches!(result, Err(Error::InvalidUrl { ref message }) if message.contains("ftp")));

        let prefixed = resolve_url("x", &Options::new().prefix_url("file:///srv"));
        assert!(matches!(prefixed, Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn relative_input_without_prefix_fails() {
        let result = resolve_url("users", &Options::new());
        assert!(matches!(result, Err(Error::UrlParse(_))));
    }

    #[test]
    fn params_use_default_serializer() {
        let options = Options::new()
            .param("a", 1)
            .param("b", vec![1, 2]);
        let url = resolve_url("http://api.test/items", &options).unwrap();
        assert_eq!(url.as_str(), "http://api.test/items?a=1&b=1&b=2");
    }

    #[test]
    fn params_append_to_existing_query() {
        let options = Options::new().param("page", 2);
        let url = resolve_url("http://api.test/items?sort=asc", &options).unwrap();
        assert_eq!(url.query(), Some("sort=asc&page=2"));
    }

    #[test]
    fn configured_serializer_is_used() {
        let options = Options::new()
            .param("b", vec![1, 2])
            .serializer(Brackets);
        let url = resolve_url("http://api.test/items", &options).unwrap();
        assert_eq!(url.query(), Some("b%5B%5D=1&b%5B%5D=2"));

        let custom = Options::new()
            .param("ignored", 1)
            .serializer(|_: &Params| "fixed=1".to_string());
        let url = resolve_url("http://api.test/items", &custom).unwrap();
        assert_eq!(url.query(), Some("fixed=1"));
    }

    #[test]
    fn json_body_sets_content_type() {
        let options = Options::new().method(Method::POST).json(json!({"a": 1}));
        let request = Request::build("http://api.test/items", &options).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(request.body.as_deref(), Some(&br#"{"a":1}"#[..]));
    }

    #[test]
    fn json_body_keeps_explicit_content_type() {
        let options = Options::new()
            .header("Content-Type", "application/vnd.api+json")
            .json(json!([]));
        let request = Request::build("http://api.test/items", &options).unwrap();

        assert_eq!(
            request.headers.get(CONTENT_TYPE).unwrap(),
            "application/vnd.api+json"
        );
    }

    #[test]
    fn raw_body_and_default_method() {
        let options = Options::new().body("plain");
        let request = Request::build("http://api.test/", &options).unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.body, Some(Bytes::from_static(b"plain")));
        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn invalid_header_fails_the_build() {
        let options = Options::new().header("bad header", "x");
        let result = Request::build("http://api.test/", &options);
        assert!(matches!(result, Err(Error::InvalidHeaderName(_))));
    }
}
