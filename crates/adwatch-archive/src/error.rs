use thiserror::Error;

/// Errors returned by the archive client.
///
/// Messages never include request URLs: the credential travels as a query
/// parameter.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The archive answered with its `{"error": {...}}` envelope.
    #[error("archive API error{}: {message}", api_code_suffix(*code))]
    Api { code: Option<i64>, message: String },

    /// Non-2xx status without a readable error envelope.
    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The walk followed more continuation cursors than allowed.
    #[error("pagination limit reached: exceeded {max_pages} pages")]
    PaginationLimit { max_pages: usize },

    /// A base URL or continuation cursor is not a usable URL.
    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

fn api_code_suffix(code: Option<i64>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}
