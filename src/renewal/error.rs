/// Error taxonomy for the renewal engine
use crate::error::AcmeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenewalError>;

/// Error kinds produced by the renewal engine (§7). Transport-level failures
/// from the ACME client wrapper are wrapped rather than flattened so the
/// server's problem document survives to the caller.
#[derive(Error, Debug)]
pub enum RenewalError {
    #[error("No {0} plugin could be selected")]
    PluginUnavailable(String),

    #[error("Renewal target not found")]
    TargetGone,

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("No certificate generated")]
    CertificateMissing,

    #[error("Store failed: {0}")]
    StoreFailed(String),

    #[error("Install failed: {0}")]
    InstallFailed(String),

    #[error("Delete failed: {0}")]
    PruneFailed(String),

    #[error("Invalid validation/installation input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Acme(#[from] AcmeError),

    #[error("{0}")]
    Unexpected(String),
}

impl RenewalError {
    pub fn plugin_unavailable(family: impl Into<String>) -> Self {
        RenewalError::PluginUnavailable(family.into())
    }

    pub fn authorization_failed(detail: impl Into<String>) -> Self {
        RenewalError::AuthorizationFailed(detail.into())
    }

    pub fn store_failed(detail: impl Into<String>) -> Self {
        RenewalError::StoreFailed(detail.into())
    }

    pub fn install_failed(detail: impl Into<String>) -> Self {
        RenewalError::InstallFailed(detail.into())
    }

    pub fn prune_failed(detail: impl Into<String>) -> Self {
        RenewalError::PruneFailed(detail.into())
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        RenewalError::InvalidInput(detail.into())
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        RenewalError::Unexpected(detail.into())
    }
}
