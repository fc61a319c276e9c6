//! Object-storage seam.
//!
//! The synchronizer only needs three verbs from the provider. Anything that
//! implements [`ObjectStore`] can stand in for S3, including test doubles.

use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketProbe {
    Exists,
    Missing,
}

/// Everything needed to upload one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub cache_control: String,
    pub body: Vec<u8>,
}

pub trait ObjectStore {
    /// Region this store signs requests for.
    fn region(&self) -> &str;

    fn head_bucket(&self, bucket: &str) -> Result<BucketProbe>;

    /// Create a bucket. `location` must be `None` for the provider's default
    /// region.
    fn create_bucket(&self, bucket: &str, location: Option<&str>) -> Result<()>;

    fn put_object(&self, object: &PutObject) -> Result<()>;
}

/// Join an optional key prefix and a relative artifact path.
pub fn object_key(prefix: &str, relative_path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        relative_path.to_string()
    } else {
        format!("{}/{}", prefix, relative_path)
    }
}
