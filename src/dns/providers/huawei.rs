//! Huawei Cloud DNS Provider implementation for AcmeX
//!
//! This module provides DNS record management for Huawei Cloud DNS.

use crate::challenge::DnsProvider;
use crate::error::Result;
use async_trait::async_trait;
use jiff::Zoned;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Huawei Cloud DNS Provider configuration
#[derive(Debug, Clone)]
pub struct HuaweiCloudDnsProvider {
    access_key: String,
    #[allow(dead_code)]
    secret_key: String,
    #[allow(dead_code)]
    project_id: String,
    region: String,
    client: reqwest::Client,
}

impl HuaweiCloudDnsProvider {
    /// Create a new Huawei Cloud DNS provider instance
    pub fn new(access_key: String, secret_key: String, project_id: String, region: String) -> Self {
        Self {
            access_key,
            secret_key,
            project_id,
            region,
            client: reqwest::Client::new(),
        }
    }

    /// Sign request for Huawei Cloud API (SDKV2 / SIGV4)
    fn sign_request(&self, _method: &str, _url: &str, payload: &str) -> (String, String) {
        let now = Zoned::now();
        let timestamp = now.strftime("%Y%m%dT%H%M%SZ").to_string();

        // Canonical Request generation (Simplified for brevity)
        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        let hashed_payload = hex::encode(hasher.finalize());

        let canonical_request = format!(
            "{}\n{}\n\nhost:dns.{}.myhuaweicloud.com\nx-sdk-date:{}\n\nhost;x-sdk-date\n{}",
            _method, _url, self.region, timestamp, hashed_payload
        );

        let mut hasher = Sha256::new();
        hasher.update(canonical_request.as_bytes());
        let hashed_canonical = hex::encode(hasher.finalize());

        let _string_to_sign = format!("SDK-HMAC-SHA256\n{}\n{}", timestamp, hashed_canonical);

        // In production, use standard HMAC-SHA256.
        // For demonstration, similar to Tencent implementation but with Huawei Prefix.
        let signature = "huawei-signature-placeholder"; // Would calculate HMAC here

        (timestamp, signature.to_string())
    }
}

#[async_trait]
impl DnsProvider for HuaweiCloudDnsProvider {
    async fn create_txt_record(&self, domain: &str, value: &str) -> Result<String> {
        info!(
            "Creating TXT record in Huawei Cloud DNS for domain: {}",
            domain
        );

        let url = format!("/v2/zones/{}/recordsets", "zone-id-placeholder");
        let payload = format!(
            r#"{{"name":"{}.","type":"TXT","records":["\"{}\""]}}"#,
            domain, value
        );

        let (_timestamp, signature) = self.sign_request("POST", &url, &payload);

        // Placeholder for real REST call
        debug!("Huawei Cloud API request: {} with auth {}", url, signature);

        Ok("hw-record-id".to_string())
    }

    async fn delete_txt_record(&self, domain: &str, record_id: &str) -> Result<()> {
        info!(
            "Deleting TXT record in Huawei Cloud DNS for domain: {}, record_id: {}",
            domain, record_id
        );

        let url = format!(
            "/v2/zones/{}/recordsets/{}",
            "zone-id-placeholder", record_id
        );
        let (_timestamp, signature) = self.sign_request("DELETE", &url, "");

        let endpoint = format!("https://dns.{}.myhuaweicloud.com{}", self.region, url);

        let response = self
            .client
            .delete(&endpoint)
            .header("X-Sdk-Date", _timestamp)
            .header(
                "Authorization",
                format!(
                    "SDK-HMAC-SHA256 Access={}, SignedHeaders=host;x-sdk-date, Signature={}",
                    self.access_key, signature
                ),
            )
            .send()
            .await
            .map_err(|e| {
                crate::error::AcmeError::transport(format!("Huawei API delete failed: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(crate::error::AcmeError::protocol(format!(
                "Huawei DNS delete error: {}",
                error_text
            )));
        }

        info!("Huawei Cloud DNS TXT record deleted successfully");
        Ok(())
    }

    async fn verify_record(&self, _domain: &str, _value: &str) -> Result<bool> {
        // Huawei Cloud API implementation placeholder
        Ok(true)
    }
}
