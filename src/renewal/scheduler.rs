/// Scheduler loop (C7): iterates the renewal registry, selects due records
/// (or every record under `--force-renewal`), drives each one through the
/// renewal engine, and persists the outcome before moving to the next.
///
/// `RenewalDriver::renew` never returns an error — every fallible step
/// inside it is translated into a `RenewResult` with `success=false` (see
/// `renewal::driver`) — so the "wrap C6 in try/catch, log and continue"
/// policy in the source collapses here to simply not stopping the loop on a
/// failed result. The registry write itself can still fail (disk full, …);
/// that failure is logged and does not abort the batch either, matching
/// "one failure must not abort the batch".
use super::driver::{RenewalDriver, RenewalLifecycleHook};
use super::registry::RenewalRegistry;
use super::scope::RenewalContext;
use super::target::RunOptions;
use jiff::Timestamp;

/// One record's processing outcome, reported back to the caller for logging
/// or exit-code computation (§6: "exit code reflects the last error's code").
#[derive(Debug, Clone)]
pub struct RenewOutcome {
    pub primary_host: String,
    pub success: bool,
    pub error_message: Option<String>,
}

pub struct SchedulerLoop<'a> {
    ctx: &'a RenewalContext,
    registry: &'a RenewalRegistry,
    options: &'a RunOptions,
    hook: Option<&'a dyn RenewalLifecycleHook>,
}

impl<'a> SchedulerLoop<'a> {
    pub fn new(ctx: &'a RenewalContext, registry: &'a RenewalRegistry, options: &'a RunOptions) -> Self {
        Self {
            ctx,
            registry,
            options,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: &'a dyn RenewalLifecycleHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Processes every due record, or every record when `force` is set.
    /// Records are visited in the order the registry yields them; within one
    /// record, target-refresh through scheduled-task registration happens
    /// strictly in order (§5), but across records there is no parallelism.
    pub async fn run_once(&self, force: bool) -> Vec<RenewOutcome> {
        let now = Timestamp::now();
        let mut outcomes = Vec::new();

        for renewal in self.registry.renewals().await {
            if !force && !renewal.is_due(now) {
                tracing::info!(
                    "renewal for {} due after {}, skipping",
                    renewal.target.primary_host,
                    renewal.next_due
                );
                continue;
            }

            let mut driver = RenewalDriver::new(self.ctx, self.options);
            if let Some(hook) = self.hook {
                driver = driver.with_hook(hook);
            }

            let host = renewal.target.primary_host.clone();
            let result = driver.renew(&renewal).await;
            let success = result.success;
            let error_message = result.error_message.clone();

            if let Err(e) = self.registry.save(renewal, &result).await {
                tracing::warn!(
                    "failed to persist renewal result for {host}: {e}; will retry on next run"
                );
            }

            outcomes.push(RenewOutcome {
                primary_host: host,
                success,
                error_message,
            });
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renewal::acme::{AcmeClientWrapper, Authorization, Challenge, Order};
    use crate::renewal::plugin::{
        CertificateService, NullInstallationPluginFactory, PluginRegistry, StorePlugin,
        TargetPlugin, TaskScheduler,
    };
    use crate::renewal::registry::{CertRecord, RenewalRegistry, ScheduledRenewal};
    use crate::renewal::target::{PluginCoordinates, RunLevel, Target};
    use async_trait::async_trait;
    use jiff::Span;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

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

    struct AlwaysValidAcmeClient;

    #[async_trait]
    impl AcmeClientWrapper for AlwaysValidAcmeClient {
        async fn create_order(
            &self,
            identifiers: &[String],
        ) -> super::super::error::Result<Order> {
            Ok(Order {
                url: "https://acme.test/order/1".into(),
                status: "pending".into(),
                authorizations: identifiers.iter().map(|_| "https://acme.test/authz".into()).collect(),
                finalize: "https://acme.test/finalize".into(),
                certificate: None,
            })
        }

        async fn get_authorization_details(
            &self,
            _url: &str,
        ) -> super::super::error::Result<Authorization> {
            Ok(Authorization {
                identifier: "example.com".into(),
                status: "valid".into(),
                challenges: vec![Challenge {
                    challenge_type: "http-01".into(),
                    url: "https://acme.test/chall".into(),
                    status: "valid".into(),
                    token: "token".into(),
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
                key_authorization: "key".into(),
            })
        }

        async fn submit_challenge_answer(
            &self,
            challenge: &Challenge,
        ) -> super::super::error::Result<Challenge> {
            Ok(challenge.clone())
        }

        async fn decode_challenge(&self, url: &str) -> super::super::error::Result<Challenge> {
            Ok(Challenge {
                challenge_type: "http-01".into(),
                url: url.to_string(),
                status: "valid".into(),
                token: "token".into(),
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
                thumbprint: "thumb".into(),
                certificate_pem: "PEM".into(),
                private_key_pem: "KEY".into(),
                store_ref: String::new(),
            }))
        }
    }

    struct InMemoryStore;

    #[async_trait]
    impl StorePlugin for InMemoryStore {
        async fn find_by_thumbprint(
            &self,
            _thumbprint: &str,
        ) -> super::super::error::Result<Option<CertRecord>> {
            Ok(None)
        }
        async fn save(&self, _record: CertRecord) -> super::super::error::Result<()> {
            Ok(())
        }
        async fn delete(&self, _record: &CertRecord) -> super::super::error::Result<()> {
            Ok(())
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

    fn build_ctx(task_calls: Arc<AtomicUsize>) -> RenewalContext {
        let mut registry = PluginRegistry::new();
        registry.register_target(Arc::new(ManualTargetPlugin));
        registry.register_installation(Arc::new(NullInstallationPluginFactory));
        RenewalContext::new(
            RunLevel::Unattended,
            Arc::new(registry),
            Arc::new(InMemoryStore),
            Arc::new(AlwaysValidAcmeClient),
            Arc::new(FakeCertificateService),
            Arc::new(NullTaskScheduler { calls: task_calls }),
        )
    }

    #[tokio::test]
    async fn s6_not_yet_due_is_skipped_without_driving_renewal() {
        let dir = tempfile::tempdir().unwrap();
        let registry = RenewalRegistry::open(dir.path().join("r.json"), Span::new().days(60))
            .await
            .unwrap();
        let target = Target::new("example.com", coords());
        let mut renewal = ScheduledRenewal::new(target.clone(), registry.renewal_window).unwrap();
        renewal.next_due = Timestamp::now().checked_add(Span::new().days(1)).unwrap();
        registry
            .save(renewal, &super::super::registry::RenewResult::failure("not run yet"))
            .await
            .unwrap();

        let task_calls = Arc::new(AtomicUsize::new(0));
        let ctx = build_ctx(task_calls.clone());
        let options = RunOptions::default();
        let scheduler = SchedulerLoop::new(&ctx, &registry, &options);

        let outcomes = scheduler.run_once(false).await;

        assert!(outcomes.is_empty());
        assert_eq!(task_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn due_record_is_processed_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = RenewalRegistry::open(dir.path().join("r.json"), Span::new().days(60))
            .await
            .unwrap();
        let target = Target::new("example.com", coords());
        let mut renewal = ScheduledRenewal::new(target.clone(), registry.renewal_window).unwrap();
        renewal.next_due = Timestamp::now().checked_sub(Span::new().days(1)).unwrap();
        renewal.installation_plugin_names = vec!["null".into()];
        registry
            .save(renewal, &super::super::registry::RenewResult::failure("scheduled"))
            .await
            .unwrap();

        let task_calls = Arc::new(AtomicUsize::new(0));
        let ctx = build_ctx(task_calls.clone());
        let options = RunOptions::default();
        let scheduler = SchedulerLoop::new(&ctx, &registry, &options);

        let outcomes = scheduler.run_once(false).await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success, "{:?}", outcomes[0].error_message);

        let due_again: Vec<_> = registry
            .renewals()
            .await
            .into_iter()
            .filter(|r| r.is_due(Timestamp::now()))
            .collect();
        assert!(due_again.is_empty(), "idempotent due scan must find nothing after a success");
    }
}
