#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Query parameters must be an object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("Unsupported value for query parameter '{key}': {kind}")]
    UnsupportedValue { key: String, kind: &'static str },
}
