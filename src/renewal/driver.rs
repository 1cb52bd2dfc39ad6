/// Renewal driver (C6): the end-to-end pipeline for one `ScheduledRenewal`,
/// from target refresh through order creation, per-identifier authorization,
/// certificate issuance, storage, installation, post-install scripting,
/// pruning, and scheduled-task bookkeeping.
///
/// Rust's `Result` already gives every fallible step a typed outcome, so the
/// "exceptions as terminal signals" pattern from the source collapses to
/// plain control flow: steps before a certificate exists return early with
/// `RenewResult::failure`; steps after mutate an already-built `RenewResult`
/// in place, exactly as §4.6 describes.
use super::acme::Authorization;
use super::authorization::{AuthorizationDriver, AuthorizationOutcome};
use super::error::RenewalError;
use super::plugin::PluginSelection;
use super::registry::{CertRecord, RenewResult, ScheduledRenewal};
use super::scope::RenewalContext;
use super::target::{RunOptions, Target, concatenated_alternative_names, union_hosts};
use std::time::Duration;

/// Adapted from `acmex::renewal::RenewalHook`, but speaking in this
/// engine's own `CertRecord`/`RenewResult` vocabulary instead of
/// `CertificateBundle`. Additive instrumentation: default methods are
/// no-ops, so a driver with no hook behaves identically to one with a
/// `&NoopHook`.
pub trait RenewalLifecycleHook: Send + Sync {
    /// Called before a renewal attempt starts.
    fn before_renewal(&self, _hosts: &[String]) {}

    /// Called after a renewal attempt completes, successfully or not.
    fn after_renewal(&self, _hosts: &[String], _result: &RenewResult) {}
}

/// Runs a single `ScheduledRenewal` through the pipeline in §4.6.
pub struct RenewalDriver<'a> {
    ctx: &'a RenewalContext,
    options: &'a RunOptions,
    hook: Option<&'a dyn RenewalLifecycleHook>,
    max_tries: u32,
    poll_interval: Duration,
}

impl<'a> RenewalDriver<'a> {
    pub fn new(ctx: &'a RenewalContext, options: &'a RunOptions) -> Self {
        Self {
            ctx,
            options,
            hook: None,
            max_tries: 4,
            poll_interval: Duration::from_secs(2),
        }
    }

    pub fn with_hook(mut self, hook: &'a dyn RenewalLifecycleHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn with_poll_params(mut self, max_tries: u32, poll_interval: Duration) -> Self {
        self.max_tries = max_tries;
        self.poll_interval = poll_interval;
        self
    }

    pub async fn renew(&self, renewal: &ScheduledRenewal) -> RenewResult {
        let hosts = renewal.target.get_hosts(false);
        if let Some(hook) = self.hook {
            hook.before_renewal(&hosts);
        }

        let result = self.run(renewal).await;

        if let Some(hook) = self.hook {
            hook.after_renewal(&hosts, &result);
        }

        result
    }

    async fn run(&self, renewal: &ScheduledRenewal) -> RenewResult {
        // Step 1: refresh target.
        let target_plugin = match self
            .ctx
            .registry
            .resolve_target(&renewal.target.plugin.target_plugin)
            .selected()
        {
            Some(plugin) => plugin,
            None => {
                return RenewResult::failure(RenewalError::plugin_unavailable("target").to_string());
            }
        };

        let refreshed = match target_plugin.refresh(&renewal.target).await {
            Some(target) => target,
            None => return RenewResult::failure(RenewalError::TargetGone.to_string()),
        };

        // Step 2: split into sub-targets; identifiers are the distinct
        // union of hosts across them.
        let sub_targets = target_plugin.split(&refreshed);
        let mut binding = refreshed;
        binding.alternative_names = concatenated_alternative_names(&sub_targets);
        let identifiers = union_hosts(&sub_targets);

        // Step 3: order + fetch every authorization.
        let order = match self.ctx.acme_client.create_order(&identifiers).await {
            Ok(order) => order,
            Err(e) => return RenewResult::failure(e.to_string()),
        };

        let mut authorizations: Vec<Authorization> = Vec::with_capacity(order.authorizations.len());
        for url in &order.authorizations {
            match self.ctx.acme_client.get_authorization_details(url).await {
                Ok(auth) => authorizations.push(auth),
                Err(e) => return RenewResult::failure(e.to_string()),
            }
        }

        // Step 4: authorize every identifier. First invalid aborts.
        let auth_driver = AuthorizationDriver::new(self.ctx)
            .with_poll_params(self.max_tries, self.poll_interval);
        for authorization in &authorizations {
            let owner = sub_targets
                .iter()
                .find(|t| {
                    t.get_hosts(false)
                        .iter()
                        .any(|h| h == &authorization.identifier)
                })
                .unwrap_or(&binding);

            let outcome = auth_driver
                .authorize(
                    owner,
                    self.options,
                    authorization.clone(),
                    &owner.plugin.validation_plugin,
                    renewal.test_mode,
                )
                .await;

            if let AuthorizationOutcome::Invalid(detail) = outcome {
                tracing::warn!(
                    "authorization for {} did not succeed: {detail}",
                    authorization.identifier
                );
                return RenewResult::failure(
                    RenewalError::authorization_failed(detail).to_string(),
                );
            }
        }

        // Step 5: request the certificate.
        let cert = match self
            .ctx
            .certificate_service
            .request_certificate(&binding, &order)
            .await
        {
            Ok(Some(cert)) => cert,
            Ok(None) => {
                return RenewResult::failure(RenewalError::CertificateMissing.to_string());
            }
            Err(e) => return RenewResult::failure(e.to_string()),
        };

        // Step 6: test gate. A fresh renewal under test mode may be asked
        // to stop here with no store/install side effects.
        if renewal.test_mode && renewal.is_new {
            let proceed = self
                .ctx
                .confirm
                .confirm("Install the newly issued certificate?")
                .await;
            if !proceed {
                return RenewResult::success_without_certificate();
            }
        }

        let mut result = RenewResult::success(cert.clone());

        // Step 7: store.
        let stored_cert = match self.store(&cert).await {
            Ok(cert) => cert,
            Err(e) => {
                result.success = false;
                result.error_message = Some(RenewalError::store_failed(e.to_string()).to_string());
                return result;
            }
        };
        result.certificate = Some(stored_cert.clone());

        // Step 8: install.
        let old_certificate = renewal.certificate.as_ref();
        let install_failed = self
            .install(renewal, &stored_cert, old_certificate, &mut result)
            .await;

        if install_failed {
            return result;
        }

        // Step 8.5: post-install script, best-effort.
        if let Some(script) = &renewal.script {
            if let Err(e) = run_post_install_script(
                script,
                renewal.script_parameters.as_deref(),
                &stored_cert,
            )
            .await
            {
                tracing::warn!("post-install script failed: {e}");
                append_warning(&mut result, format!("Script failed: {e}"));
            }
        }

        // Step 9: prune the old certificate.
        let keep_existing = renewal.keep_existing.unwrap_or(false);
        if !keep_existing {
            if let Some(old) = old_certificate {
                if old.thumbprint != stored_cert.thumbprint {
                    if let Err(e) = self.ctx.store.delete(old).await {
                        append_warning(
                            &mut result,
                            RenewalError::prune_failed(e.to_string()).to_string(),
                        );
                    }
                }
            }
        }

        // Step 10: ensure the scheduled task exists, for a brand-new
        // renewal only, unless suppressed by options.
        if renewal.is_new && !self.options.no_task_scheduler {
            let should_schedule = if renewal.test_mode {
                self.ctx
                    .confirm
                    .confirm("Register the recurring renewal task?")
                    .await
            } else {
                true
            };

            if should_schedule {
                if let Err(e) = self.ctx.task_scheduler.ensure_task_scheduler().await {
                    tracing::warn!("failed to ensure scheduled task: {e}");
                }
            }
        }

        result
    }

    /// Step 7: adopt an existing store reference on a thumbprint hit,
    /// otherwise persist the new certificate.
    async fn store(&self, cert: &CertRecord) -> Result<CertRecord, RenewalError> {
        match self.ctx.store.find_by_thumbprint(&cert.thumbprint).await? {
            Some(existing) => {
                tracing::info!("certificate {} already in store", cert.thumbprint);
                let mut adopted = cert.clone();
                adopted.store_ref = existing.store_ref;
                Ok(adopted)
            }
            None => {
                self.ctx.store.save(cert.clone()).await?;
                Ok(cert.clone())
            }
        }
    }

    /// Step 8: resolve the selected installation factories and run each in
    /// list order. A failing step is caught once around the whole loop —
    /// remaining factories are never invoked (S5) — and the result is
    /// mutated in place to record the failure.
    async fn install(
        &self,
        renewal: &ScheduledRenewal,
        new_cert: &CertRecord,
        old_cert: Option<&CertRecord>,
        result: &mut RenewResult,
    ) -> bool {
        let factories = match self
            .ctx
            .registry
            .resolve_installations(&renewal.installation_plugin_names)
        {
            PluginSelection::Selected(factories) => factories,
            _ => {
                result.success = false;
                result.error_message =
                    Some(RenewalError::plugin_unavailable("installation").to_string());
                return true;
            }
        };

        let total = factories.len();
        for (index, factory) in factories.iter().enumerate() {
            tracing::info!("install step {}/{total}", index + 1);
            let instance = factory.instance();
            if let Err(e) = instance.install(new_cert, old_cert).await {
                result.success = false;
                result.error_message = Some(RenewalError::install_failed(e.to_string()).to_string());
                return true;
            }
        }

        false
    }
}

/// Appends a non-fatal warning to the result's error message without
/// flipping `success` — used by the post-install script and prune steps,
/// which record but never abort an otherwise-successful renewal.
fn append_warning(result: &mut RenewResult, message: String) {
    result.error_message = Some(match result.error_message.take() {
        Some(existing) => format!("{existing}; {message}"),
        None => message,
    });
}

/// Runs the renewal's post-install script, if any, passing the new
/// certificate's PEM path's worth of context via environment variables
/// (the process-spawning surface itself — finding a shell, setting a
/// working directory — is host-application policy, not this core's).
async fn run_post_install_script(
    script: &std::path::Path,
    parameters: Option<&str>,
    cert: &CertRecord,
) -> std::io::Result<()> {
    let mut command = tokio::process::Command::new(script);
    if let Some(parameters) = parameters {
        command.arg(parameters);
    }
    command.env("ACMEX_CERT_THUMBPRINT", &cert.thumbprint);

    let status = command.status().await?;
    if !status.success() {
        return Err(std::io::Error::other(format!(
            "script exited with status {status}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renewal::acme::{AcmeClientWrapper, Challenge, Order};
    use crate::renewal::plugin::{
        CertificateService, ConfirmationPrompt, InstallationPlugin, InstallationPluginFactory,
        NullInstallationPluginFactory, PluginRegistry, StorePlugin, TargetPlugin, TaskScheduler,
        ValidationPlugin, ValidationPluginFactory,
    };
    use crate::renewal::target::{PluginCoordinates, RunLevel};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex as TokioMutex;

    fn coords() -> PluginCoordinates {
        PluginCoordinates {
            target_plugin: "manual".into(),
            validation_plugin: "http01".into(),
            challenge_type: "http-01".into(),
        }
    }

    struct ManualTargetPlugin;

    #[async_trait]
    impl TargetPlugin for ManualTargetPlugin {
        fn name(&self) -> &str {
            "manual"
        }

        async fn default(&self, _options: &RunOptions) -> Option<Target> {
            None
        }

        async fn acquire(&self, _options: &RunOptions, _run_level: RunLevel) -> Option<Target> {
            None
        }

        async fn refresh(&self, target: &Target) -> Option<Target> {
            Some(target.clone())
        }
    }

    struct FakeValidationPlugin;

    #[async_trait]
    impl ValidationPlugin for FakeValidationPlugin {
        async fn prepare_challenge(
            &mut self,
            _details: &super::super::plugin::ChallengeDetails,
        ) -> super::super::error::Result<()> {
            Ok(())
        }
    }

    struct Http01Factory;

    #[async_trait]
    impl ValidationPluginFactory for Http01Factory {
        fn name(&self) -> &str {
            "http01"
        }

        fn challenge_type(&self) -> &str {
            "http-01"
        }

        fn can_validate(&self, _target: &Target) -> bool {
            true
        }

        async fn default(&self, _target: &Target, _options: &RunOptions) -> Option<()> {
            Some(())
        }

        async fn acquire(
            &self,
            _target: &Target,
            _options: &RunOptions,
            _run_level: RunLevel,
        ) -> super::super::error::Result<Box<dyn ValidationPlugin>> {
            Ok(Box::new(FakeValidationPlugin))
        }
    }

    struct InMemoryStore {
        records: TokioMutex<Vec<CertRecord>>,
        save_calls: AtomicUsize,
        delete_calls: AtomicUsize,
    }

    impl InMemoryStore {
        fn new() -> Self {
            Self {
                records: TokioMutex::new(Vec::new()),
                save_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StorePlugin for InMemoryStore {
        async fn find_by_thumbprint(
            &self,
            thumbprint: &str,
        ) -> super::super::error::Result<Option<CertRecord>> {
            Ok(self
                .records
                .lock()
                .await
                .iter()
                .find(|r| r.thumbprint == thumbprint)
                .cloned())
        }

        async fn save(&self, record: CertRecord) -> super::super::error::Result<()> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            self.records.lock().await.push(record);
            Ok(())
        }

        async fn delete(&self, record: &CertRecord) -> super::super::error::Result<()> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.records
                .lock()
                .await
                .retain(|r| r.thumbprint != record.thumbprint);
            Ok(())
        }
    }

    struct RecordingInstaller {
        calls: Arc<TokioMutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl InstallationPlugin for RecordingInstaller {
        async fn install(
            &self,
            new: &CertRecord,
            _old: Option<&CertRecord>,
        ) -> super::super::error::Result<()> {
            self.calls.lock().await.push(new.thumbprint.clone());
            if self.fail {
                return Err(super::super::error::RenewalError::unexpected("boom"));
            }
            Ok(())
        }
    }

    struct RecordingInstallerFactory {
        name: String,
        calls: Arc<TokioMutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl InstallationPluginFactory for RecordingInstallerFactory {
        fn name(&self) -> &str {
            &self.name
        }

        async fn default(&self, _options: &RunOptions) -> Option<()> {
            Some(())
        }

        async fn acquire(
            &self,
            _options: &RunOptions,
            _run_level: RunLevel,
        ) -> super::super::error::Result<()> {
            Ok(())
        }

        fn instance(&self) -> Box<dyn InstallationPlugin> {
            Box::new(RecordingInstaller {
                calls: self.calls.clone(),
                fail: self.fail,
            })
        }
    }

    struct FakeAcmeClient {
        authorization_status: String,
        challenge_status_sequence: TokioMutex<Vec<String>>,
        decode_calls: AtomicUsize,
    }

    #[async_trait]
    impl AcmeClientWrapper for FakeAcmeClient {
        async fn create_order(&self, identifiers: &[String]) -> super::super::error::Result<Order> {
            Ok(Order {
                url: "https://acme.test/order/1".into(),
                status: "pending".into(),
                authorizations: identifiers
                    .iter()
                    .map(|_| "https://acme.test/authz/1".into())
                    .collect(),
                finalize: "https://acme.test/finalize/1".into(),
                certificate: None,
            })
        }

        async fn get_authorization_details(
            &self,
            _url: &str,
        ) -> super::super::error::Result<Authorization> {
            Ok(Authorization {
                identifier: "example.com".into(),
                status: self.authorization_status.clone(),
                challenges: vec![Challenge {
                    challenge_type: "http-01".into(),
                    url: "https://acme.test/chall/1".into(),
                    status: "pending".into(),
                    token: "token123".into(),
                    error: None,
                }],
            })
        }

        async fn get_challenge_details(
            &self,
            _auth: &Authorization,
            challenge: &Challenge,
        ) -> super::super::error::Result<super::super::plugin::ChallengeDetails> {
            Ok(super::super::plugin::ChallengeDetails {
                token: challenge.token.clone(),
                key_authorization: format!("{}.thumb", challenge.token),
            })
        }

        async fn submit_challenge_answer(
            &self,
            challenge: &Challenge,
        ) -> super::super::error::Result<Challenge> {
            Ok(challenge.clone())
        }

        async fn decode_challenge(&self, url: &str) -> super::super::error::Result<Challenge> {
            self.decode_calls.fetch_add(1, Ordering::SeqCst);
            let mut seq = self.challenge_status_sequence.lock().await;
            let status = if seq.is_empty() {
                "pending".to_string()
            } else {
                seq.remove(0)
            };
            Ok(Challenge {
                challenge_type: "http-01".into(),
                url: url.to_string(),
                status,
                token: "token123".into(),
                error: None,
            })
        }
    }

    struct FakeCertificateService;

    #[async_trait]
    impl CertificateService for FakeCertificateService {
        async fn request_certificate(
            &self,
            _target: &Target,
            _order: &Order,
        ) -> super::super::error::Result<Option<CertRecord>> {
            Ok(Some(CertRecord {
                thumbprint: "thumb-1".into(),
                certificate_pem: "PEM".into(),
                private_key_pem: "KEY".into(),
                store_ref: String::new(),
            }))
        }
    }

    struct NullTaskScheduler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TaskScheduler for NullTaskScheduler {
        async fn ensure_task_scheduler(&self) -> super::super::error::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct AlwaysYes;

    #[async_trait]
    impl ConfirmationPrompt for AlwaysYes {
        async fn confirm(&self, _question: &str) -> bool {
            true
        }
    }

    fn build_registry(installers: Vec<Arc<dyn InstallationPluginFactory>>) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register_target(Arc::new(ManualTargetPlugin));
        registry.register_validation(Arc::new(Http01Factory));
        for installer in installers {
            registry.register_installation(installer);
        }
        registry.register_installation(Arc::new(NullInstallationPluginFactory));
        registry
    }

    fn scheduled_renewal(installation_names: Vec<String>) -> ScheduledRenewal {
        let target = Target::new("example.com", coords());
        let mut renewal =
            ScheduledRenewal::new(target, super::super::registry::RenewalRegistry::default_window())
                .unwrap();
        renewal.installation_plugin_names = installation_names;
        renewal
    }

    #[tokio::test]
    async fn s1_cached_valid_skips_challenge_and_installs() {
        let acme = Arc::new(FakeAcmeClient {
            authorization_status: "valid".into(),
            challenge_status_sequence: TokioMutex::new(Vec::new()),
            decode_calls: AtomicUsize::new(0),
        });
        let calls = Arc::new(TokioMutex::new(Vec::new()));
        let installer = Arc::new(RecordingInstallerFactory {
            name: "install-a".into(),
            calls: calls.clone(),
            fail: false,
        });
        let registry = Arc::new(build_registry(vec![installer]));
        let store = Arc::new(InMemoryStore::new());
        let task_calls = Arc::new(AtomicUsize::new(0));
        let ctx = RenewalContext::new(
            RunLevel::Unattended,
            registry,
            store.clone(),
            acme.clone(),
            Arc::new(FakeCertificateService),
            Arc::new(NullTaskScheduler {
                calls: task_calls.clone(),
            }),
        )
        .with_confirmation(Arc::new(AlwaysYes));

        let options = RunOptions::default();
        let driver = RenewalDriver::new(&ctx, &options);
        let renewal = scheduled_renewal(vec!["install-a".into()]);

        let result = driver.renew(&renewal).await;

        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(acme.decode_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.save_calls.load(Ordering::SeqCst), 1);
        assert_eq!(calls.lock().await.len(), 1);
        assert_eq!(task_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn s3_poll_timeout_exhausts_max_tries_then_fails() {
        let acme = Arc::new(FakeAcmeClient {
            authorization_status: "pending".into(),
            challenge_status_sequence: TokioMutex::new(Vec::new()),
            decode_calls: AtomicUsize::new(0),
        });
        let registry = Arc::new(build_registry(vec![]));
        let store = Arc::new(InMemoryStore::new());
        let ctx = RenewalContext::new(
            RunLevel::Unattended,
            registry,
            store.clone(),
            acme.clone(),
            Arc::new(FakeCertificateService),
            Arc::new(NullTaskScheduler {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let options = RunOptions::default();
        let driver = RenewalDriver::new(&ctx, &options).with_poll_params(4, Duration::from_millis(1));
        let renewal = scheduled_renewal(vec![]);

        let result = driver.renew(&renewal).await;

        assert!(!result.success);
        assert_eq!(acme.decode_calls.load(Ordering::SeqCst), 4);
        assert_eq!(store.save_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            result.error_message.as_deref(),
            Some("Authorization failed: authorization timed out")
        );
    }

    #[tokio::test]
    async fn s4_already_in_store_skips_save_but_still_installs() {
        let acme = Arc::new(FakeAcmeClient {
            authorization_status: "valid".into(),
            challenge_status_sequence: TokioMutex::new(Vec::new()),
            decode_calls: AtomicUsize::new(0),
        });
        let calls = Arc::new(TokioMutex::new(Vec::new()));
        let installer = Arc::new(RecordingInstallerFactory {
            name: "install-a".into(),
            calls: calls.clone(),
            fail: false,
        });
        let registry = Arc::new(build_registry(vec![installer]));
        let store = Arc::new(InMemoryStore::new());
        store.records.lock().await.push(CertRecord {
            thumbprint: "thumb-1".into(),
            certificate_pem: "PEM".into(),
            private_key_pem: "KEY".into(),
            store_ref: "store://existing".into(),
        });
        let ctx = RenewalContext::new(
            RunLevel::Unattended,
            registry,
            store.clone(),
            acme,
            Arc::new(FakeCertificateService),
            Arc::new(NullTaskScheduler {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let options = RunOptions::default();
        let driver = RenewalDriver::new(&ctx, &options);
        let renewal = scheduled_renewal(vec!["install-a".into()]);

        let result = driver.renew(&renewal).await;

        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(store.save_calls.load(Ordering::SeqCst), 0);
        assert_eq!(calls.lock().await.len(), 1);
        assert_eq!(
            result.certificate.unwrap().store_ref,
            "store://existing".to_string()
        );
    }

    #[tokio::test]
    async fn s5_install_failure_stops_remaining_steps_and_skips_prune_and_schedule() {
        let acme = Arc::new(FakeAcmeClient {
            authorization_status: "valid".into(),
            challenge_status_sequence: TokioMutex::new(Vec::new()),
            decode_calls: AtomicUsize::new(0),
        });
        let calls = Arc::new(TokioMutex::new(Vec::new()));
        let first = Arc::new(RecordingInstallerFactory {
            name: "install-a".into(),
            calls: calls.clone(),
            fail: true,
        });
        let second = Arc::new(RecordingInstallerFactory {
            name: "install-b".into(),
            calls: calls.clone(),
            fail: false,
        });
        let registry = Arc::new(build_registry(vec![first, second]));
        let store = Arc::new(InMemoryStore::new());
        let task_calls = Arc::new(AtomicUsize::new(0));
        let ctx = RenewalContext::new(
            RunLevel::Unattended,
            registry,
            store.clone(),
            acme,
            Arc::new(FakeCertificateService),
            Arc::new(NullTaskScheduler {
                calls: task_calls.clone(),
            }),
        );
        let options = RunOptions::default();
        let driver = RenewalDriver::new(&ctx, &options);
        let mut renewal = scheduled_renewal(vec!["install-a".into(), "install-b".into()]);
        renewal.is_new = false;
        renewal.certificate = Some(CertRecord {
            thumbprint: "old-thumb".into(),
            certificate_pem: "OLD".into(),
            private_key_pem: "OLDKEY".into(),
            store_ref: "store://old".into(),
        });

        let result = driver.renew(&renewal).await;

        assert!(!result.success);
        assert!(
            result
                .error_message
                .as_deref()
                .unwrap_or_default()
                .starts_with("Install failed:")
        );
        assert_eq!(calls.lock().await.len(), 1, "second installer must not run");
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(task_calls.load(Ordering::SeqCst), 0);
    }

    struct CountingValidationPlugin {
        prepare_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ValidationPlugin for CountingValidationPlugin {
        async fn prepare_challenge(
            &mut self,
            _details: &super::super::plugin::ChallengeDetails,
        ) -> super::super::error::Result<()> {
            self.prepare_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct CountingHttp01Factory {
        prepare_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ValidationPluginFactory for CountingHttp01Factory {
        fn name(&self) -> &str {
            "http01"
        }

        fn challenge_type(&self) -> &str {
            "http-01"
        }

        fn can_validate(&self, _target: &Target) -> bool {
            true
        }

        async fn default(&self, _target: &Target, _options: &RunOptions) -> Option<()> {
            Some(())
        }

        async fn acquire(
            &self,
            _target: &Target,
            _options: &RunOptions,
            _run_level: RunLevel,
        ) -> super::super::error::Result<Box<dyn ValidationPlugin>> {
            Ok(Box::new(CountingValidationPlugin {
                prepare_calls: self.prepare_calls.clone(),
            }))
        }
    }

    struct CountingAcmeClient {
        submit_calls: AtomicUsize,
        decode_calls: AtomicUsize,
    }

    #[async_trait]
    impl AcmeClientWrapper for CountingAcmeClient {
        async fn create_order(&self, identifiers: &[String]) -> super::super::error::Result<Order> {
            Ok(Order {
                url: "https://acme.test/order/1".into(),
                status: "pending".into(),
                authorizations: identifiers
                    .iter()
                    .map(|_| "https://acme.test/authz/1".into())
                    .collect(),
                finalize: "https://acme.test/finalize/1".into(),
                certificate: None,
            })
        }

        async fn get_authorization_details(
            &self,
            _url: &str,
        ) -> super::super::error::Result<Authorization> {
            Ok(Authorization {
                identifier: "example.com".into(),
                status: "pending".into(),
                challenges: vec![Challenge {
                    challenge_type: "http-01".into(),
                    url: "https://acme.test/chall/1".into(),
                    status: "pending".into(),
                    token: "token123".into(),
                    error: None,
                }],
            })
        }

        async fn get_challenge_details(
            &self,
            _auth: &Authorization,
            challenge: &Challenge,
        ) -> super::super::error::Result<super::super::plugin::ChallengeDetails> {
            Ok(super::super::plugin::ChallengeDetails {
                token: challenge.token.clone(),
                key_authorization: format!("{}.thumb", challenge.token),
            })
        }

        async fn submit_challenge_answer(
            &self,
            challenge: &Challenge,
        ) -> super::super::error::Result<Challenge> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            Ok(challenge.clone())
        }

        async fn decode_challenge(&self, url: &str) -> super::super::error::Result<Challenge> {
            let n = self.decode_calls.fetch_add(1, Ordering::SeqCst);
            let status = if n == 0 { "valid" } else { "valid" };
            Ok(Challenge {
                challenge_type: "http-01".into(),
                url: url.to_string(),
                status: status.to_string(),
                token: "token123".into(),
                error: None,
            })
        }
    }

    #[tokio::test]
    async fn s2_http01_happy_path_prepares_submits_and_decodes_exactly_once() {
        let acme = Arc::new(CountingAcmeClient {
            submit_calls: AtomicUsize::new(0),
            decode_calls: AtomicUsize::new(0),
        });
        let prepare_calls = Arc::new(AtomicUsize::new(0));
        let mut registry = PluginRegistry::new();
        registry.register_target(Arc::new(ManualTargetPlugin));
        registry.register_validation(Arc::new(CountingHttp01Factory {
            prepare_calls: prepare_calls.clone(),
        }));
        registry.register_installation(Arc::new(NullInstallationPluginFactory));
        let store = Arc::new(InMemoryStore::new());
        let ctx = RenewalContext::new(
            RunLevel::Unattended,
            Arc::new(registry),
            store.clone(),
            acme.clone(),
            Arc::new(FakeCertificateService),
            Arc::new(NullTaskScheduler {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let options = RunOptions::default();
        let driver =
            RenewalDriver::new(&ctx, &options).with_poll_params(4, Duration::from_millis(1));
        let renewal = scheduled_renewal(vec![]);

        let result = driver.renew(&renewal).await;

        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(prepare_calls.load(Ordering::SeqCst), 1);
        assert_eq!(acme.submit_calls.load(Ordering::SeqCst), 1);
        assert_eq!(acme.decode_calls.load(Ordering::SeqCst), 1);
    }
}
