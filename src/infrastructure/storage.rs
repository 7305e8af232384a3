// src/infrastructure/storage.rs
//
// S3 object storage through presigned URLs (AWS Signature Version 4,
// query-string authentication). The same URLs are used for display, upload
// and removal, so no request ever needs a signed body.
use crate::application::ObjectStorage;
use crate::domain::DomainError;
use crate::infrastructure::config::StorageConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
/// Presigned URLs for upload and removal only need to live for the request
const WRITE_URL_EXPIRY_SECS: u64 = 60;

/// Everything except the unreserved characters of RFC 3986
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Like [`QUERY_ENCODE_SET`], but keeps `/` between key segments
const PATH_ENCODE_SET: &AsciiSet = &QUERY_ENCODE_SET.remove(b'/');

#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

pub struct S3Storage {
    bucket: String,
    region: String,
    credentials: Credentials,
    display_expiry_secs: u64,
    client: reqwest::Client,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            credentials: Credentials {
                access_key_id: config.access_key_id.clone(),
                secret_access_key: config.secret_access_key.clone(),
                session_token: Some(config.session_token.clone()).filter(|t| !t.is_empty()),
            },
            display_expiry_secs: config.url_expiry_secs,
            client: reqwest::Client::new(),
        }
    }

    /// Virtual-hosted endpoint; us-east-1 also answers on the global host
    fn host(&self) -> String {
        if self.region == "us-east-1" {
            format!("{}.s3.amazonaws.com", self.bucket)
        } else {
            format!("{}.s3.{}.amazonaws.com", self.bucket, self.region)
        }
    }

    /// Presign `method` on `key`, valid for `expires_secs` from `now`
    pub fn presign(&self, method: &str, key: &str, expires_secs: u64, now: DateTime<Utc>) -> String {
        let host = self.host();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);
        let canonical_uri = format!("/{}", utf8_percent_encode(key, PATH_ENCODE_SET));

        let mut params = vec![
            ("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()),
            (
                "X-Amz-Credential".to_string(),
                format!("{}/{scope}", self.credentials.access_key_id),
            ),
            ("X-Amz-Date".to_string(), amz_date.clone()),
            ("X-Amz-Expires".to_string(), expires_secs.to_string()),
            ("X-Amz-SignedHeaders".to_string(), "host".to_string()),
        ];
        if let Some(token) = &self.credentials.session_token {
            params.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        let mut encoded: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        encoded.sort();
        let canonical_query = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{canonical_query}\nhost:{host}\n\nhost\n{UNSIGNED_PAYLOAD}"
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = [self.region.as_str(), SERVICE, "aws4_request"].iter().fold(
            hmac(
                format!("AWS4{}", self.credentials.secret_access_key).as_bytes(),
                date.as_bytes(),
            ),
            |key, part| hmac(&key, part.as_bytes()),
        );
        let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes()));

        format!("https://{host}{canonical_uri}?{canonical_query}&X-Amz-Signature={signature}")
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<(), DomainError> {
        let resp = request
            .send()
            .await
            .map_err(|e| DomainError::Storage(format!("{what} failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Storage(format!("{what} HTTP {status}: {body}")));
        }
        Ok(())
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET).to_string()
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[async_trait]
impl ObjectStorage for S3Storage {
    #[instrument(level = "debug", skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), DomainError> {
        let url = self.presign("PUT", key, WRITE_URL_EXPIRY_SECS, Utc::now());
        let request = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        self.send(request, &format!("Upload of {key}")).await?;
        debug!(%key, "Uploaded object");
        Ok(())
    }

    async fn resolve_url(&self, key: &str) -> Result<String, DomainError> {
        if key.is_empty() {
            return Err(DomainError::Storage("Cannot resolve an empty key".to_string()));
        }
        Ok(self.presign("GET", key, self.display_expiry_secs, Utc::now()))
    }

    #[instrument(level = "debug", skip(self))]
    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let url = self.presign("DELETE", key, WRITE_URL_EXPIRY_SECS, Utc::now());
        self.send(self.client.delete(url), &format!("Removal of {key}"))
            .await
    }
}
