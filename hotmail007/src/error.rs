use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Response error: StatusCode: {0} Text: {1}")]
    Response(reqwest::StatusCode, String),

    #[error("Failed to deserialize response ({0}): {1}")]
    Deserialize(serde_json::Error, String),

    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("Request limiter closed")]
    LimiterClosed(#[from] tokio::sync::AcquireError),
}
