//! Uniform fetch API over HTTPS, S3, and local filesystem backends.

use bytes::Bytes;
use serde_json::Value;

use crate::error::{EptError, EptResult};
#[cfg(feature = "http-async")]
use crate::source_http::HttpSource;
#[cfg(feature = "fs-async")]
use crate::source_fs::FsSource;
#[cfg(feature = "__async-s3")]
use crate::source_s3::S3Source;

/// A guard returned by [`Source::scope`]. Acquisition and release bracket
/// a batch of fetches so backends that pool connections (HTTP keep-alive,
/// S3 client reuse) can share one connection across the batch; the scope
/// is released on drop regardless of whether the batch succeeded.
pub struct SourceScope<'s> {
    _source: &'s Source,
}

impl Drop for SourceScope<'_> {
    fn drop(&mut self) {
        log::trace!("source scope released");
    }
}

/// A fetchable EPT dataset root, dispatched to one of the three supported
/// backends by the URI scheme passed to [`Source::open`].
pub enum Source {
    #[cfg(feature = "http-async")]
    Http(HttpSource),
    #[cfg(feature = "__async-s3")]
    S3(S3Source),
    #[cfg(feature = "fs-async")]
    Fs(FsSource),
}

impl Source {
    /// Opens a Source for `uri`, dispatching on its scheme prefix:
    /// `s3://bucket/prefix`, `https://host/prefix`, or a local path.
    /// Fails with [`EptError::UnknownScheme`] if none match.
    pub fn open(uri: &str) -> EptResult<Self> {
        #[cfg(feature = "__async-s3")]
        if let Some(rest) = uri.strip_prefix("s3://") {
            return Ok(Source::S3(S3Source::from_uri(rest)?));
        }
        #[cfg(feature = "http-async")]
        if uri.starts_with("https://") || uri.starts_with("http://") {
            return Ok(Source::Http(HttpSource::new(uri)?));
        }
        #[cfg(feature = "fs-async")]
        {
            return Ok(Source::Fs(FsSource::new(uri)));
        }
        #[allow(unreachable_code)]
        Err(EptError::UnknownScheme(uri.to_string()))
    }

    /// Acquires a scope bracketing a batch of fetches.
    #[must_use]
    pub fn scope(&self) -> SourceScope<'_> {
        SourceScope { _source: self }
    }

    /// Fetches `path` relative to this source's root as a JSON object.
    pub async fn get_json(&self, path: &str) -> EptResult<Value> {
        match self {
            #[cfg(feature = "http-async")]
            Source::Http(s) => s.get_json(path).await,
            #[cfg(feature = "__async-s3")]
            Source::S3(s) => s.get_json(path).await,
            #[cfg(feature = "fs-async")]
            Source::Fs(s) => s.get_json(path).await,
        }
    }

    /// Fetches `path` relative to this source's root as an opaque byte blob.
    pub async fn get_bytes(&self, path: &str) -> EptResult<Bytes> {
        match self {
            #[cfg(feature = "http-async")]
            Source::Http(s) => s.get_bytes(path).await,
            #[cfg(feature = "__async-s3")]
            Source::S3(s) => s.get_bytes(path).await,
            #[cfg(feature = "fs-async")]
            Source::Fs(s) => s.get_bytes(path).await,
        }
    }
}
