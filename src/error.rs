use thiserror::Error;

/// Structural problems with a request body. Raised before the pipeline runs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("observations field is missing")]
    MissingObservations,
    #[error("observations must be a list")]
    ObservationsNotList,
    #[error("observations list is empty")]
    EmptyObservations,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min}")]
    TooSmall { field: &'static str, min: usize },
    #[error("target word range is inverted: {min} > {max}")]
    InvertedWordRange { min: usize, max: usize },
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0} is not set")]
    MissingEnv(&'static str),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),
    #[error("request to generation service failed: {0}")]
    Transport(String),
    #[error("generation service timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response from generation service: {0}")]
    MalformedResponse(String),
}
