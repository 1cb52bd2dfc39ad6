/// Renewal registry (C2): persists the set of scheduled renewals.
use super::error::{RenewalError, Result};
use super::target::Target;
use jiff::{Span, Timestamp};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A certificate previously issued or stored: stable thumbprint, the PEM
/// bytes, and a reference to the store plugin instance that holds it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertRecord {
    pub thumbprint: String,
    pub certificate_pem: String,
    pub private_key_pem: String,
    /// Opaque reference into the owning store (e.g. a file path or a
    /// certificate-store friendly name). Adopted as-is when a find-by-thumbprint
    /// hit means the record is not re-saved.
    pub store_ref: String,
}

/// The persistent record pairing a Target with run history and next-due date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledRenewal {
    pub target: Target,
    pub last_run: Option<Timestamp>,
    pub next_due: Timestamp,
    pub is_new: bool,
    pub updated: bool,
    pub test_mode: bool,
    pub script: Option<PathBuf>,
    pub script_parameters: Option<String>,
    pub central_ssl_store: Option<String>,
    pub certificate_store: Option<String>,
    pub keep_existing: Option<bool>,
    pub installation_plugin_names: Vec<String>,
    pub warmup: bool,
    /// The certificate this record currently points at, if any — the "old"
    /// certificate seen by the install/prune steps of the next renewal.
    pub certificate: Option<CertRecord>,
}

impl ScheduledRenewal {
    pub fn new(target: Target, renewal_window: Span) -> Result<Self> {
        if target.plugin.is_empty() {
            return Err(RenewalError::invalid_input(
                "target plugin coordinates must not be empty",
            ));
        }
        let next_due = Timestamp::now()
            .checked_add(renewal_window)
            .map_err(|e| RenewalError::unexpected(format!("invalid renewal window: {e}")))?;
        Ok(Self {
            target,
            last_run: None,
            next_due,
            is_new: true,
            updated: false,
            test_mode: false,
            script: None,
            script_parameters: None,
            central_ssl_store: None,
            certificate_store: None,
            keep_existing: None,
            installation_plugin_names: Vec::new(),
            warmup: false,
            certificate: None,
        })
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_due < now
    }
}

/// Success flag, optional error message, optional reference to the produced
/// certificate record.
#[derive(Debug, Clone)]
pub struct RenewResult {
    pub success: bool,
    pub error_message: Option<String>,
    pub certificate: Option<CertRecord>,
}

impl RenewResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            certificate: None,
        }
    }

    pub fn success(certificate: CertRecord) -> Self {
        Self {
            success: true,
            error_message: None,
            certificate: Some(certificate),
        }
    }

    /// Success with no certificate side effects — the test-mode short
    /// circuit in step 6 of the renewal driver.
    pub fn success_without_certificate() -> Self {
        Self {
            success: true,
            error_message: None,
            certificate: None,
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    renewals: Vec<ScheduledRenewal>,
}

/// Persists the set of scheduled renewals as JSON, loaded eagerly and
/// rewritten whole (write-to-temp-then-rename) on every mutating call —
/// the same "small file, rewritten whole" pattern the storage backends use
/// for their own namespaced entries.
pub struct RenewalRegistry {
    path: PathBuf,
    renewals: Arc<RwLock<Vec<ScheduledRenewal>>>,
    pub renewal_window: Span,
}

impl RenewalRegistry {
    /// Default renewal window: 60 days.
    pub fn default_window() -> Span {
        Span::new().days(60)
    }

    pub async fn open(path: impl AsRef<Path>, renewal_window: Span) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let renewals = if path.exists() {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| RenewalError::unexpected(format!("read registry: {e}")))?;
            let file: RegistryFile = serde_json::from_str(&content)
                .map_err(|e| RenewalError::unexpected(format!("parse registry: {e}")))?;
            file.renewals
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            renewals: Arc::new(RwLock::new(renewals)),
            renewal_window,
        })
    }

    async fn flush(&self, renewals: &[ScheduledRenewal]) -> Result<()> {
        let file = RegistryFile {
            renewals: renewals.to_vec(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| RenewalError::unexpected(format!("serialize registry: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RenewalError::unexpected(format!("create registry dir: {e}")))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| RenewalError::unexpected(format!("write registry: {e}")))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| RenewalError::unexpected(format!("rename registry: {e}")))?;
        Ok(())
    }

    /// Matches by Target identity (primary host and plugin coordinates).
    pub async fn find(&self, target: &Target) -> Option<ScheduledRenewal> {
        let renewals = self.renewals.read().await;
        renewals
            .iter()
            .find(|r| r.target.same_identity(target))
            .cloned()
    }

    /// Persists the record with outcome; on success sets `is_new=false`,
    /// records the timestamp, and computes the next due date. Replaces in
    /// place if a record with the same Target identity already exists.
    pub async fn save(&self, mut renewal: ScheduledRenewal, result: &RenewResult) -> Result<()> {
        let now = Timestamp::now();
        renewal.last_run = Some(now);
        if result.success {
            renewal.is_new = false;
            renewal.next_due = now
                .checked_add(self.renewal_window)
                .map_err(|e| RenewalError::unexpected(format!("invalid renewal window: {e}")))?;
            if let Some(cert) = &result.certificate {
                renewal.certificate = Some(cert.clone());
            }
        }

        let mut renewals = self.renewals.write().await;
        if let Some(existing) = renewals
            .iter_mut()
            .find(|r| r.target.same_identity(&renewal.target))
        {
            renewal.updated = true;
            *existing = renewal;
        } else {
            renewals.push(renewal);
        }
        self.flush(&renewals).await
    }

    /// Removes the record matching this renewal's target, if any.
    pub async fn cancel(&self, target: &Target) -> Result<()> {
        let mut renewals = self.renewals.write().await;
        renewals.retain(|r| !r.target.same_identity(target));
        self.flush(&renewals).await
    }

    /// Snapshot of all scheduled records.
    pub async fn renewals(&self) -> Vec<ScheduledRenewal> {
        self.renewals.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renewal::target::PluginCoordinates;

    fn coords() -> PluginCoordinates {
        PluginCoordinates {
            target_plugin: "manual".into(),
            validation_plugin: "http01".into(),
            challenge_type: "http-01".into(),
        }
    }

    async fn temp_registry() -> (RenewalRegistry, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renewals.json");
        let registry = RenewalRegistry::open(&path, RenewalRegistry::default_window())
            .await
            .unwrap();
        (registry, dir)
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let (registry, _dir) = temp_registry().await;
        let target = Target::new("example.com", coords());
        let renewal = ScheduledRenewal::new(target.clone(), registry.renewal_window).unwrap();

        registry
            .save(renewal, &RenewResult::success(CertRecord {
                thumbprint: "abc".into(),
                certificate_pem: String::new(),
                private_key_pem: String::new(),
                store_ref: "store://abc".into(),
            }))
            .await
            .unwrap();

        let found = registry.find(&target).await.expect("record present");
        assert!(!found.is_new);
        assert_eq!(found.certificate.unwrap().thumbprint, "abc");
    }

    #[tokio::test]
    async fn cancel_removes_record() {
        let (registry, _dir) = temp_registry().await;
        let target = Target::new("example.com", coords());
        let renewal = ScheduledRenewal::new(target.clone(), registry.renewal_window).unwrap();
        registry
            .save(renewal, &RenewResult::failure("boom"))
            .await
            .unwrap();
        assert!(registry.find(&target).await.is_some());

        registry.cancel(&target).await.unwrap();
        assert!(registry.find(&target).await.is_none());
    }

    #[tokio::test]
    async fn save_replaces_existing_record_in_place() {
        let (registry, _dir) = temp_registry().await;
        let target = Target::new("example.com", coords());
        let first = ScheduledRenewal::new(target.clone(), registry.renewal_window).unwrap();
        registry
            .save(first, &RenewResult::failure("first failure"))
            .await
            .unwrap();

        let second = ScheduledRenewal::new(target.clone(), registry.renewal_window).unwrap();
        registry
            .save(second, &RenewResult::failure("second failure"))
            .await
            .unwrap();

        assert_eq!(registry.renewals().await.len(), 1);
    }

    #[tokio::test]
    async fn idempotent_due_scan_with_unadvanced_clock() {
        let (registry, _dir) = temp_registry().await;
        let target = Target::new("example.com", coords());
        let mut renewal = ScheduledRenewal::new(target, registry.renewal_window).unwrap();
        renewal.next_due = Timestamp::now().checked_sub(Span::new().days(1)).unwrap();
        registry
            .save(renewal, &RenewResult::success(CertRecord {
                thumbprint: "abc".into(),
                certificate_pem: String::new(),
                private_key_pem: String::new(),
                store_ref: "store://abc".into(),
            }))
            .await
            .unwrap();

        // After a successful save, next_due has moved into the future, so a
        // second force=false scan at the same instant finds nothing due.
        let due_now: Vec<_> = registry
            .renewals()
            .await
            .into_iter()
            .filter(|r| r.is_due(Timestamp::now()))
            .collect();
        assert!(due_now.is_empty());
    }
}
