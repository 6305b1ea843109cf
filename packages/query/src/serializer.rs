//! Query-string serializers.
//!
//! Values are encoded with `application/x-www-form-urlencoded` rules, the
//! same encoder browsers use for `URLSearchParams` (spaces become `+`).

use url::form_urlencoded;

use crate::{ParamValue, Params};

/// Turns parameters into a query string, without the leading `?`.
///
/// Implemented for any `Fn(&Params) -> String`, so a closure can be used
/// wherever a serializer is expected.
pub trait QuerySerializer: Send + Sync {
    fn serialize(&self, params: &Params) -> String;
}

impl<F> QuerySerializer for F
where
    F: Fn(&Params) -> String + Send + Sync,
{
    fn serialize(&self, params: &Params) -> String {
        self(params)
    }
}

/// The default serializer: list values repeat their key (`a=1&a=2`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatedKeys;

impl QuerySerializer for RepeatedKeys {
    fn serialize(&self, params: &Params) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        for (key, value) in params.iter() {
            for v in value.values() {
                out.append_pair(key, v);
            }
        }
        out.finish()
    }
}

/// Bracketed list notation (`a[]=1&a[]=2`). Single values are unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Brackets;

impl QuerySerializer for Brackets {
    fn serialize(&self, params: &Params) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        for (key, value) in params.iter() {
            match value {
                ParamValue::Single(v) => {
                    out.append_pair(key, v);
                }
                ParamValue::List(values) => {
                    let key = format!("{}[]", key);
                    for v in values {
                        out.append_pair(&key, v);
                    }
                }
            }
        }
        out.finish()
    }
}

/// Serialize with the default repeated-key algorithm.
pub fn serialize(params: &Params) -> String {
    RepeatedKeys.serialize(params)
}

/// Parse a query string back into parameters.
///
/// A leading `?` is ignored. Keys seen more than once collect into a list
/// in the order they appear.
pub fn parse(query: &str) -> Params {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = Params::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params.append(key.into_owned(), value.into_owned());
    }
    params
}
