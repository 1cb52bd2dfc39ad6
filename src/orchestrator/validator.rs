/// Domain validation orchestration
use crate::config::Config;
use crate::error::Result;
use super::Orchestrator;
use async_trait::async_trait;

/// Orchestrator for validating domain control
pub struct DomainValidator {
    domains: Vec<String>,
}

impl DomainValidator {
    /// Create a new validator
    pub fn new(domains: Vec<String>) -> Self {
        Self { domains }
    }
}

#[async_trait]
impl Orchestrator for DomainValidator {
    async fn execute(&self, _config: &Config) -> Result<()> {
        tracing::info!("Starting domain validation for: {:?}", self.domains);

        // This would implement pre-flight checks to ensure:
        // 1. DNS records point to this server (for HTTP-01)
        // 2. DNS API credentials are valid (for DNS-01)
        // 3. Ports are accessible

        // Placeholder implementation
        tracing::info!("Domain validation completed successfully");

        Ok(())
    }
}
