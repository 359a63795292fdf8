//! Read path for Entwine Point Tile (EPT) octree archives: hierarchy
//! traversal, overlap queries, and LAZ tile fetch/merge/clip over
//! HTTP/S3/FS backends.

mod bbox;
mod error;
mod fetch;
mod hierarchy;
mod info;
mod key;
mod overlap;
mod pointcloud;
mod query;
mod registry;
mod resource;
mod source;
#[cfg(feature = "fs-async")]
mod source_fs;
#[cfg(feature = "http-async")]
mod source_http;
#[cfg(feature = "__async-s3")]
mod source_s3;

pub use bbox::{BoundingBox2D, BoundingBox3D};
pub use error::{EptError, EptResult};
pub use fetch::{fetch_tiles, DEFAULT_CONCURRENCY};
pub use hierarchy::{load_hierarchy, Hierarchy};
pub use info::Info;
pub use key::{Key, KeyId};
pub use overlap::select as select_overlap;
pub use pointcloud::PointCloud;
pub use query::{DepthRange, QueryBounds, QueryParams};
pub use registry::Registry;
pub use resource::{BlockingEptResource, EptResource};
pub use source::{Source, SourceScope};

/// Re-export of crate exposed in our API to simplify dependency management.
#[cfg(feature = "http-async")]
pub use reqwest;
/// Re-export of crate exposed in our API to simplify dependency management.
#[cfg(feature = "__async-s3")]
pub use s3;
/// Re-export of crate exposed in our API to simplify dependency management.
pub use las;
