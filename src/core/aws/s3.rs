//! S3 REST client (path-style addressing).

use chrono::Utc;
use reqwest::blocking::{Client, Response};
use reqwest::Method;

use super::sigv4::{uri_encode_path, Signer};
use super::{blocking_client, require_credentials, xml_escape, Credentials};
use crate::error::{Error, Result};
use crate::storage::{BucketProbe, ObjectStore, PutObject};

const SERVICE: &str = "s3";

pub struct S3Client {
    http: Client,
    credentials: Option<Credentials>,
    region: String,
}

impl S3Client {
    pub fn new(region: &str, credentials: Option<Credentials>) -> Result<Self> {
        Ok(Self {
            http: blocking_client()?,
            credentials,
            region: region.to_string(),
        })
    }

    pub fn host(&self) -> String {
        format!("s3.{}.amazonaws.com", self.region)
    }

    fn send(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Vec<u8>,
        extra: &[(&str, &str)],
    ) -> Result<Response> {
        let credentials = require_credentials(&self.credentials)?;
        let signer = Signer {
            credentials,
            region: &self.region,
            service: SERVICE,
        };

        let host = self.host();
        let uri = uri_encode_path(path);
        let signed = signer.sign(method.as_str(), &host, &uri, &body, extra, Utc::now());

        let mut request = self
            .http
            .request(method, format!("https://{}{}", host, uri))
            .body(body);
        for (name, value) in signed {
            request = request.header(name, value);
        }

        request
            .send()
            .map_err(|e| Error::storage_request_failed(operation, None, e.to_string()))
    }
}

fn failure(operation: &str, response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    Error::storage_request_failed(operation, Some(status), body)
}

/// Request body for `CreateBucket` outside the default region.
pub fn create_bucket_body(location: Option<&str>) -> Vec<u8> {
    match location {
        Some(region) => format!(
            "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
             <LocationConstraint>{}</LocationConstraint>\
             </CreateBucketConfiguration>",
            xml_escape(region)
        )
        .into_bytes(),
        None => Vec::new(),
    }
}

impl ObjectStore for S3Client {
    fn region(&self) -> &str {
        &self.region
    }

    fn head_bucket(&self, bucket: &str) -> Result<BucketProbe> {
        let response = self.send("head_bucket", Method::HEAD, &format!("/{}", bucket), Vec::new(), &[])?;
        let status = response.status();

        if status.is_success() {
            Ok(BucketProbe::Exists)
        } else if status.is_client_error() || status.is_redirection() {
            crate::log_status!("sync", "head bucket {} returned HTTP {}", bucket, status.as_u16());
            Ok(BucketProbe::Missing)
        } else {
            Err(failure("head_bucket", response))
        }
    }

    fn create_bucket(&self, bucket: &str, location: Option<&str>) -> Result<()> {
        let response = self.send(
            "create_bucket",
            Method::PUT,
            &format!("/{}", bucket),
            create_bucket_body(location),
            &[],
        )?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(failure("create_bucket", response))
        }
    }

    fn put_object(&self, object: &PutObject) -> Result<()> {
        let response = self.send(
            "put_object",
            Method::PUT,
            &format!("/{}/{}", object.bucket, object.key),
            object.body.clone(),
            &[
                ("content-type", object.content_type.as_str()),
                ("cache-control", object.cache_control.as_str()),
            ],
        )?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(failure("put_object", response).with_hint(format!("key: {}", object.key)))
        }
    }
}
