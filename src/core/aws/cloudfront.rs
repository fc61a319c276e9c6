//! CloudFront invalidation client.

use chrono::Utc;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Method;

use super::sigv4::{uri_encode_path, Signer};
use super::{blocking_client, require_credentials, xml_escape, Credentials};
use crate::cdn::CdnProvider;
use crate::error::{Error, Result};

const HOST: &str = "cloudfront.amazonaws.com";
const API_VERSION: &str = "2020-05-31";
/// CloudFront is a global service signed in us-east-1.
const SIGNING_REGION: &str = "us-east-1";
const SERVICE: &str = "cloudfront";

pub struct CloudFrontClient {
    http: Client,
    credentials: Option<Credentials>,
}

impl CloudFrontClient {
    pub fn new(credentials: Option<Credentials>) -> Result<Self> {
        Ok(Self {
            http: blocking_client()?,
            credentials,
        })
    }
}

pub fn invalidation_batch(paths: &[&str], caller_reference: &str) -> String {
    let items: String = paths
        .iter()
        .map(|p| format!("<Path>{}</Path>", xml_escape(p)))
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <InvalidationBatch xmlns=\"http://cloudfront.amazonaws.com/doc/{}/\">\
         <Paths><Quantity>{}</Quantity><Items>{}</Items></Paths>\
         <CallerReference>{}</CallerReference>\
         </InvalidationBatch>",
        API_VERSION,
        paths.len(),
        items,
        xml_escape(caller_reference)
    )
}

/// Pull the invalidation id out of a `CreateInvalidation` response body.
pub fn parse_invalidation_id(body: &str) -> Result<String> {
    let re = Regex::new(r"<Id>\s*([^<\s]+)\s*</Id>")
        .map_err(|e| Error::internal_unexpected(e.to_string()))?;

    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            Error::cdn_request_failed("create_invalidation", None, body)
                .with_hint("Response did not contain an invalidation Id")
        })
}

impl CdnProvider for CloudFrontClient {
    fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[&str],
        caller_reference: &str,
    ) -> Result<String> {
        let credentials = require_credentials(&self.credentials)?;
        let signer = Signer {
            credentials,
            region: SIGNING_REGION,
            service: SERVICE,
        };

        let uri = uri_encode_path(&format!(
            "/{}/distribution/{}/invalidation",
            API_VERSION, distribution_id
        ));
        let body = invalidation_batch(paths, caller_reference).into_bytes();
        let signed = signer.sign(
            Method::POST.as_str(),
            HOST,
            &uri,
            &body,
            &[("content-type", "text/xml")],
            Utc::now(),
        );

        let mut request = self
            .http
            .request(Method::POST, format!("https://{}{}", HOST, uri))
            .body(body);
        for (name, value) in signed {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .map_err(|e| Error::cdn_request_failed("create_invalidation", None, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::cdn_request_failed("create_invalidation", Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(Error::cdn_request_failed(
                "create_invalidation",
                Some(status.as_u16()),
                text,
            ));
        }

        parse_invalidation_id(&text)
    }
}
