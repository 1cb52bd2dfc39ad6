pub mod chain;
pub mod ocsp;

pub use chain::CertificateChain;
pub use ocsp::{OcspStatus, OcspVerifier};
