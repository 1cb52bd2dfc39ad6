/// ACME client wrapper (C4): the only component in the renewal engine that
/// performs network I/O. A thin facade over the existing protocol/account/
/// order primitives, reused rather than reinvented — each call constructs
/// its managers locally the same way `AcmeClient::issue_certificate` does,
/// so no self-referential lifetimes need to be threaded across calls.
use super::error::{RenewalError, Result};
use super::plugin::{CertificateService, ChallengeDetails};
use super::registry::CertRecord;
use super::target::Target;
use crate::account::{AccountManager, KeyPair};
use crate::crypto::hash::HashAlgorithm;
use crate::order::{CsrGenerator, NewOrderRequest};
use crate::protocol::{DirectoryManager, NonceManager};
use crate::types::Identifier;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Order handle: authorization URLs and finalization URL from the CA.
#[derive(Debug, Clone)]
pub struct Order {
    pub url: String,
    pub status: String,
    pub authorizations: Vec<String>,
    pub finalize: String,
    pub certificate: Option<String>,
}

/// One challenge offered for an authorization.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub challenge_type: String,
    pub url: String,
    pub status: String,
    pub token: String,
    pub error: Option<String>,
}

/// Domain-control authorization for one identifier.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub identifier: String,
    pub status: String,
    pub challenges: Vec<Challenge>,
}

#[async_trait]
pub trait AcmeClientWrapper: Send + Sync {
    async fn create_order(&self, identifiers: &[String]) -> Result<Order>;
    async fn get_authorization_details(&self, url: &str) -> Result<Authorization>;
    async fn get_challenge_details(
        &self,
        auth: &Authorization,
        challenge: &Challenge,
    ) -> Result<ChallengeDetails>;
    async fn submit_challenge_answer(&self, challenge: &Challenge) -> Result<Challenge>;
    async fn decode_challenge(&self, url: &str) -> Result<Challenge>;
}

fn to_challenge(c: crate::order::Challenge) -> Challenge {
    Challenge {
        challenge_type: c.challenge_type,
        url: c.url,
        status: c.status,
        token: c.token,
        error: c.error.map(|v| v.to_string()),
    }
}

fn to_authorization(a: crate::order::Authorization) -> Authorization {
    Authorization {
        identifier: a.identifier.value,
        status: a.status,
        challenges: a.challenges.into_iter().map(to_challenge).collect(),
    }
}

/// Production implementation: TLS 1.2 minimum is enforced by the shared
/// `reqwest::Client` (configured with rustls, `tls12` feature enabled),
/// matching the crate-wide transport constant.
pub struct LiveAcmeClient {
    directory_url: String,
    http_client: reqwest::Client,
    key_pair: Arc<KeyPair>,
    account_id: Arc<Mutex<Option<String>>>,
}

impl LiveAcmeClient {
    pub fn new(directory_url: impl Into<String>, key_pair: KeyPair) -> Self {
        Self {
            directory_url: directory_url.into(),
            http_client: reqwest::Client::new(),
            key_pair: Arc::new(key_pair),
            account_id: Arc::new(Mutex::new(None)),
        }
    }

    async fn account_id(&self) -> Result<String> {
        if let Some(id) = self.account_id.lock().await.clone() {
            return Ok(id);
        }

        let dir_mgr = DirectoryManager::new(&self.directory_url, self.http_client.clone());
        let directory = dir_mgr.get().await.map_err(RenewalError::Acme)?;
        let nonce_mgr = NonceManager::new(&directory.new_nonce, self.http_client.clone());
        let account_mgr = AccountManager::new(
            &self.key_pair,
            &nonce_mgr,
            &dir_mgr,
            &self.http_client,
        )
        .map_err(RenewalError::Acme)?;
        let account = account_mgr
            .register(Vec::new(), true)
            .await
            .map_err(RenewalError::Acme)?;

        *self.account_id.lock().await = Some(account.id.clone());
        Ok(account.id)
    }
}

#[async_trait]
impl AcmeClientWrapper for LiveAcmeClient {
    async fn create_order(&self, identifiers: &[String]) -> Result<Order> {
        let account_id = self.account_id().await?;
        let dir_mgr = DirectoryManager::new(&self.directory_url, self.http_client.clone());
        let directory = dir_mgr.get().await.map_err(RenewalError::Acme)?;
        let nonce_mgr = NonceManager::new(&directory.new_nonce, self.http_client.clone());
        let account_mgr = AccountManager::new(
            &self.key_pair,
            &nonce_mgr,
            &dir_mgr,
            &self.http_client,
        )
        .map_err(RenewalError::Acme)?;
        let order_mgr = crate::order::OrderManager::new(
            &account_mgr,
            &dir_mgr,
            &nonce_mgr,
            &self.http_client,
            account_id,
        );

        let request = NewOrderRequest {
            identifiers: identifiers.iter().map(Identifier::dns).collect(),
            not_before: None,
            not_after: None,
        };
        let (url, order) = order_mgr.create_order(&request).await.map_err(RenewalError::Acme)?;

        Ok(Order {
            url,
            status: order.status,
            authorizations: order.authorizations,
            finalize: order.finalize,
            certificate: order.certificate,
        })
    }

    async fn get_authorization_details(&self, url: &str) -> Result<Authorization> {
        let account_id = self.account_id().await?;
        let dir_mgr = DirectoryManager::new(&self.directory_url, self.http_client.clone());
        let directory = dir_mgr.get().await.map_err(RenewalError::Acme)?;
        let nonce_mgr = NonceManager::new(&directory.new_nonce, self.http_client.clone());
        let account_mgr = AccountManager::new(
            &self.key_pair,
            &nonce_mgr,
            &dir_mgr,
            &self.http_client,
        )
        .map_err(RenewalError::Acme)?;
        let order_mgr = crate::order::OrderManager::new(
            &account_mgr,
            &dir_mgr,
            &nonce_mgr,
            &self.http_client,
            account_id,
        );

        let auth = order_mgr.get_authorization(url).await.map_err(RenewalError::Acme)?;
        Ok(to_authorization(auth))
    }

    async fn get_challenge_details(
        &self,
        _auth: &Authorization,
        challenge: &Challenge,
    ) -> Result<ChallengeDetails> {
        let dir_mgr = DirectoryManager::new(&self.directory_url, self.http_client.clone());
        let directory = dir_mgr.get().await.map_err(RenewalError::Acme)?;
        let nonce_mgr = NonceManager::new(&directory.new_nonce, self.http_client.clone());
        let account_mgr = AccountManager::new(
            &self.key_pair,
            &nonce_mgr,
            &dir_mgr,
            &self.http_client,
        )
        .map_err(RenewalError::Acme)?;

        let key_authorization = account_mgr
            .compute_key_authorization(&challenge.token)
            .map_err(RenewalError::Acme)?;

        Ok(ChallengeDetails {
            token: challenge.token.clone(),
            key_authorization,
        })
    }

    async fn submit_challenge_answer(&self, challenge: &Challenge) -> Result<Challenge> {
        let account_id = self.account_id().await?;
        let dir_mgr = DirectoryManager::new(&self.directory_url, self.http_client.clone());
        let directory = dir_mgr.get().await.map_err(RenewalError::Acme)?;
        let nonce_mgr = NonceManager::new(&directory.new_nonce, self.http_client.clone());
        let account_mgr = AccountManager::new(
            &self.key_pair,
            &nonce_mgr,
            &dir_mgr,
            &self.http_client,
        )
        .map_err(RenewalError::Acme)?;
        let order_mgr = crate::order::OrderManager::new(
            &account_mgr,
            &dir_mgr,
            &nonce_mgr,
            &self.http_client,
            account_id,
        );

        let updated = order_mgr
            .respond_to_challenge(&challenge.url)
            .await
            .map_err(RenewalError::Acme)?;
        Ok(to_challenge(updated))
    }

    async fn decode_challenge(&self, url: &str) -> Result<Challenge> {
        // RFC 8555 polls a challenge with POST-as-GET (empty payload) to the
        // same URL used to submit it, so this reuses the same call as
        // `submit_challenge_answer` rather than re-triggering validation.
        let account_id = self.account_id().await?;
        let dir_mgr = DirectoryManager::new(&self.directory_url, self.http_client.clone());
        let directory = dir_mgr.get().await.map_err(RenewalError::Acme)?;
        let nonce_mgr = NonceManager::new(&directory.new_nonce, self.http_client.clone());
        let account_mgr = AccountManager::new(
            &self.key_pair,
            &nonce_mgr,
            &dir_mgr,
            &self.http_client,
        )
        .map_err(RenewalError::Acme)?;
        let order_mgr = crate::order::OrderManager::new(
            &account_mgr,
            &dir_mgr,
            &nonce_mgr,
            &self.http_client,
            account_id,
        );

        let challenge = order_mgr
            .respond_to_challenge(url)
            .await
            .map_err(RenewalError::Acme)?;
        Ok(to_challenge(challenge))
    }
}

/// `LiveAcmeClient` also plays the role of the `CertificateService` (§4.6
/// step 5): finalization must run under the same account that created the
/// order, so this is implemented on the same struct rather than a second
/// one that would need to re-derive (and risk mismatching) the account id.
#[async_trait]
impl CertificateService for LiveAcmeClient {
    async fn request_certificate(
        &self,
        target: &Target,
        order: &Order,
    ) -> Result<Option<CertRecord>> {
        let account_id = self.account_id().await?;
        let dir_mgr = DirectoryManager::new(&self.directory_url, self.http_client.clone());
        let directory = dir_mgr.get().await.map_err(RenewalError::Acme)?;
        let nonce_mgr = NonceManager::new(&directory.new_nonce, self.http_client.clone());
        let account_mgr = AccountManager::new(
            &self.key_pair,
            &nonce_mgr,
            &dir_mgr,
            &self.http_client,
        )
        .map_err(RenewalError::Acme)?;
        let order_mgr = crate::order::OrderManager::new(
            &account_mgr,
            &dir_mgr,
            &nonce_mgr,
            &self.http_client,
            account_id,
        );

        let ready = order_mgr
            .poll_order(&order.url, 30, Duration::from_secs(2))
            .await
            .map_err(RenewalError::Acme)?;
        if ready.status != "ready" {
            return Err(RenewalError::unexpected(format!(
                "order not ready for finalization: {}",
                ready.status
            )));
        }

        let hosts = target.get_hosts(false);
        let csr_gen = CsrGenerator::new(hosts);
        let (csr_der, private_key_pem) = csr_gen.generate().map_err(RenewalError::Acme)?;

        order_mgr
            .finalize_order(&order.finalize, &csr_der)
            .await
            .map_err(RenewalError::Acme)?;

        let finalized = order_mgr
            .poll_order(&order.url, 30, Duration::from_secs(2))
            .await
            .map_err(RenewalError::Acme)?;
        if finalized.status != "valid" {
            return Ok(None);
        }

        let Some(certificate_url) = finalized.certificate else {
            return Ok(None);
        };

        let certificate_pem = order_mgr
            .download_certificate(&certificate_url)
            .await
            .map_err(RenewalError::Acme)?;

        let thumbprint = HashAlgorithm::Sha256
            .hash_hex(certificate_pem.as_bytes())
            .map_err(RenewalError::Acme)?;

        Ok(Some(CertRecord {
            thumbprint,
            certificate_pem,
            private_key_pem,
            store_ref: String::new(),
        }))
    }
}
