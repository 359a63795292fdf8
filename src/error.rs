use std::error::Error as StdError;

/// Result alias used throughout this crate.
pub type EptResult<T> = Result<T, EptError>;

/// Errors surfaced by the EPT read path.
#[derive(thiserror::Error, Debug)]
pub enum EptError {
    /// Bounding-box construction with `min` exceeding `max` on some axis.
    #[error("invalid bounds: min {0:?} must not exceed max {1:?}")]
    InvalidBounds([f64; 3], [f64; 3]),

    /// A `DepthRange` was constructed with a negative depth.
    #[error("invalid depth range: {0}")]
    InvalidDepth(String),

    /// A Source URI did not match any recognized scheme.
    #[error("unknown source scheme in uri: {0}")]
    UnknownScheme(String),

    /// A Source GET failed (network, 4xx/5xx, `NoSuchKey`, IO).
    #[error("fetch failed for {uri}: {cause}")]
    FetchFailed {
        /// The path or URI that could not be fetched.
        uri: String,
        /// The underlying cause.
        #[source]
        cause: Box<EptError>,
    },

    /// A hierarchy chunk was not a JSON object of `string -> int`.
    #[error("malformed hierarchy chunk at {0}")]
    MalformedHierarchy(String),

    /// `entwine.json` was missing `bounds` or had a malformed value.
    #[error("malformed entwine.json: {0}")]
    MalformedInfo(String),

    /// The LAZ decoder rejected a tile.
    #[error("laz decode failed for {key}: {cause}")]
    DecodeFailed {
        /// The tile key that failed to decode.
        key: String,
        /// The underlying codec error.
        #[source]
        cause: Box<dyn StdError + Send + Sync>,
    },

    /// HTTP transport error.
    #[cfg(feature = "http-async")]
    #[error("http error")]
    Reqwest(#[from] reqwest::Error),

    /// S3 transport error.
    #[cfg(feature = "__async-s3")]
    #[error("s3 error")]
    S3(#[from] s3::error::S3Error),

    /// Local filesystem / generic IO error.
    #[error("io error")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json error")]
    Json(#[from] serde_json::Error),

    /// LAS/LAZ codec error.
    #[error("las error")]
    Las(#[from] las::Error),
}

impl EptError {
    /// Wraps `self` as the cause of a [`EptError::FetchFailed`] for `uri`.
    #[must_use]
    pub fn into_fetch_failed(self, uri: impl Into<String>) -> Self {
        EptError::FetchFailed {
            uri: uri.into(),
            cause: Box::new(self),
        }
    }
}
