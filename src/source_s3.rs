//! S3 `Source` backend, built on the `rust-s3` (`s3`) crate.

use bytes::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use serde_json::Value;

use crate::error::{EptError, EptResult};

/// Fetches dataset files from an S3 bucket, rooted at a key prefix.
pub struct S3Source {
    bucket: Box<Bucket>,
    prefix: String,
}

impl S3Source {
    /// Parses the `bucket/prefix...` remainder of an `s3://` URI (the
    /// `s3://` scheme itself is stripped by the caller, [`crate::Source::open`]).
    pub fn from_uri(rest: &str) -> EptResult<Self> {
        let (bucket_name, prefix) = rest
            .split_once('/')
            .unwrap_or((rest, ""));

        let credentials = Credentials::anonymous()
            .or_else(|_| Credentials::default())
            .map_err(|e| EptError::UnknownScheme(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, Region::default(), credentials)
            .map_err(EptError::from)?;

        Ok(Self {
            bucket,
            prefix: prefix.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn with_bucket(bucket: Box<Bucket>, prefix: String) -> Self {
        Self { bucket, prefix }
    }

    fn full_path(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{path}", self.prefix)
        }
    }

    async fn fetch(&self, path: &str) -> EptResult<Bytes> {
        let full = self.full_path(path);
        log::debug!("GET s3://{}/{full}", self.bucket.name);
        let response = self
            .bucket
            .get_object(&full)
            .await
            .map_err(EptError::from)
            .map_err(|e| e.into_fetch_failed(full.clone()))?;
        Ok(response.bytes().clone())
    }

    pub async fn get_json(&self, path: &str) -> EptResult<Value> {
        let bytes = self.fetch(path).await?;
        serde_json::from_slice(&bytes).map_err(EptError::from)
    }

    pub async fn get_bytes(&self, path: &str) -> EptResult<Bytes> {
        self.fetch(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_joins_prefix() {
        let src = S3Source {
            bucket: Bucket::new(
                "my-bucket",
                Region::default(),
                Credentials::anonymous().unwrap(),
            )
            .unwrap(),
            prefix: "datasets/autzen".to_string(),
        };
        assert_eq!(src.full_path("entwine.json"), "datasets/autzen/entwine.json");
    }

    #[test]
    fn test_empty_prefix_passes_path_through() {
        let src = S3Source {
            bucket: Bucket::new(
                "my-bucket",
                Region::default(),
                Credentials::anonymous().unwrap(),
            )
            .unwrap(),
            prefix: String::new(),
        };
        assert_eq!(src.full_path("entwine.json"), "entwine.json");
    }
}
