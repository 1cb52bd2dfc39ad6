/// Authorization driver (C5): per-identifier domain-control validation
/// state machine. Any error outside the explicit edges below is caught at
/// the driver boundary, logged, and classified as an invalid outcome — the
/// driver itself never propagates an error to its caller.
use super::acme::Authorization;
use super::error::Result;
use super::scope::RenewalContext;
use super::target::{RunOptions, Target};
use std::time::Duration;

/// Outcome of validating one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Valid,
    Invalid(String),
}

pub struct AuthorizationDriver<'a> {
    ctx: &'a RenewalContext,
    pub max_tries: u32,
    pub poll_interval: Duration,
}

impl<'a> AuthorizationDriver<'a> {
    pub fn new(ctx: &'a RenewalContext) -> Self {
        Self {
            ctx,
            max_tries: 4,
            poll_interval: Duration::from_secs(2),
        }
    }

    pub fn with_poll_params(mut self, max_tries: u32, poll_interval: Duration) -> Self {
        self.max_tries = max_tries;
        self.poll_interval = poll_interval;
        self
    }

    pub async fn authorize(
        &self,
        target: &Target,
        options: &RunOptions,
        authorization: Authorization,
        validation_name: &str,
        test_mode: bool,
    ) -> AuthorizationOutcome {
        match self
            .authorize_inner(target, options, authorization, validation_name, test_mode)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("authorization driver error: {e}");
                AuthorizationOutcome::Invalid(e.to_string())
            }
        }
    }

    async fn authorize_inner(
        &self,
        target: &Target,
        options: &RunOptions,
        authorization: Authorization,
        validation_name: &str,
        test_mode: bool,
    ) -> Result<AuthorizationOutcome> {
        // CACHED-CHECK
        if authorization.status == "valid" && !test_mode {
            return Ok(AuthorizationOutcome::Valid);
        }

        // PLUGIN-RESOLVE
        let mut id_ctx = self
            .ctx
            .identifier_scope(target, &authorization.identifier, validation_name)
            .await?;

        let outcome = self
            .drive_challenge(&mut id_ctx, target, options, &authorization)
            .await;

        if let Err(e) = id_ctx.release().await {
            tracing::warn!(
                "failed to release challenge artifact for {}: {e}",
                authorization.identifier
            );
        }

        outcome
    }

    async fn drive_challenge(
        &self,
        id_ctx: &mut super::scope::IdentifierContext,
        target: &Target,
        options: &RunOptions,
        authorization: &Authorization,
    ) -> Result<AuthorizationOutcome> {
        if let Err(e) = id_ctx
            .resolve_plugin(target, options, self.ctx.run_level)
            .await
        {
            return Ok(AuthorizationOutcome::Invalid(e.to_string()));
        }

        // CHALLENGE-SELECT
        let challenge_type = id_ctx.challenge_type.clone();
        let mut challenge = match authorization
            .challenges
            .iter()
            .find(|c| c.challenge_type == challenge_type)
        {
            Some(c) => c.clone(),
            None => {
                tracing::warn!(
                    "expected challenge type {challenge_type} not available for {}",
                    authorization.identifier
                );
                return Ok(AuthorizationOutcome::Invalid(
                    "expected challenge type not available".to_string(),
                ));
            }
        };

        // EARLY-VALID
        if challenge.status == "valid" {
            return Ok(AuthorizationOutcome::Valid);
        }

        // PREPARE
        let details = self
            .ctx
            .acme_client
            .get_challenge_details(authorization, &challenge)
            .await?;

        let plugin = id_ctx
            .plugin_mut()
            .expect("validation plugin resolved above");
        if let Err(e) = plugin.prepare_challenge(&details).await {
            return Ok(AuthorizationOutcome::Invalid(format!(
                "failed to prepare challenge: {e}"
            )));
        }

        // SUBMIT
        self.ctx
            .acme_client
            .submit_challenge_answer(&challenge)
            .await?;

        // POLL — bounded by max_tries, sleeping poll_interval between
        // observations; one more pending observation after the cap yields a
        // timeout.
        for _ in 0..self.max_tries {
            tokio::time::sleep(self.poll_interval).await;
            challenge = self.ctx.acme_client.decode_challenge(&challenge.url).await?;
            if challenge.status != "pending" {
                break;
            }
        }

        if challenge.status == "pending" {
            return Ok(AuthorizationOutcome::Invalid(
                "authorization timed out".to_string(),
            ));
        }

        // CLASSIFY
        if challenge.status == "valid" {
            Ok(AuthorizationOutcome::Valid)
        } else {
            let detail = challenge
                .error
                .clone()
                .unwrap_or_else(|| challenge.status.clone());
            tracing::warn!(
                "authorization for {} ended in status {}: {detail}",
                authorization.identifier,
                challenge.status
            );
            Ok(AuthorizationOutcome::Invalid(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renewal::acme::{AcmeClientWrapper, Challenge, Order};
    use crate::renewal::plugin::{
        CertificateService, ChallengeDetails, PluginRegistry, StorePlugin, TargetPlugin,
        TaskScheduler, ValidationPlugin, ValidationPluginFactory,
    };
    use crate::renewal::registry::CertRecord;
    use crate::renewal::target::{PluginCoordinates, RunLevel};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn coords(validation: &str) -> PluginCoordinates {
        PluginCoordinates {
            target_plugin: "manual".into(),
            validation_plugin: validation.into(),
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

    struct NoopValidationPlugin;

    #[async_trait]
    impl ValidationPlugin for NoopValidationPlugin {
        async fn prepare_challenge(&mut self, _details: &ChallengeDetails) -> Result<()> {
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
        ) -> Result<Box<dyn ValidationPlugin>> {
            Ok(Box::new(NoopValidationPlugin))
        }
    }

    struct StubAcmeClient {
        challenge_type: &'static str,
    }

    #[async_trait]
    impl AcmeClientWrapper for StubAcmeClient {
        async fn create_order(&self, _identifiers: &[String]) -> Result<Order> {
            unreachable!("not exercised by authorization driver tests")
        }

        async fn get_authorization_details(&self, _url: &str) -> Result<Authorization> {
            unreachable!("authorization is passed in directly")
        }

        async fn get_challenge_details(
            &self,
            _auth: &Authorization,
            challenge: &Challenge,
        ) -> Result<ChallengeDetails> {
            Ok(ChallengeDetails {
                token: challenge.token.clone(),
                key_authorization: format!("{}.thumb", challenge.token),
            })
        }

        async fn submit_challenge_answer(&self, challenge: &Challenge) -> Result<Challenge> {
            Ok(challenge.clone())
        }

        async fn decode_challenge(&self, url: &str) -> Result<Challenge> {
            Ok(Challenge {
                challenge_type: self.challenge_type.to_string(),
                url: url.to_string(),
                status: "valid".into(),
                token: "token".into(),
                error: None,
            })
        }
    }

    struct NullStore;

    #[async_trait]
    impl StorePlugin for NullStore {
        async fn find_by_thumbprint(&self, _thumbprint: &str) -> Result<Option<CertRecord>> {
            Ok(None)
        }
        async fn save(&self, _record: CertRecord) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _record: &CertRecord) -> Result<()> {
            Ok(())
        }
    }

    struct NullCertificateService;

    #[async_trait]
    impl CertificateService for NullCertificateService {
        async fn request_certificate(
            &self,
            _target: &Target,
            _order: &super::super::acme::Order,
        ) -> Result<Option<CertRecord>> {
            Ok(None)
        }
    }

    struct NullTaskScheduler;

    #[async_trait]
    impl TaskScheduler for NullTaskScheduler {
        async fn ensure_task_scheduler(&self) -> Result<()> {
            Ok(())
        }
    }

    fn build_ctx(challenge_type: &'static str) -> RenewalContext {
        let mut registry = PluginRegistry::new();
        registry.register_target(Arc::new(ManualTargetPlugin));
        registry.register_validation(Arc::new(Http01Factory));
        RenewalContext::new(
            RunLevel::Unattended,
            Arc::new(registry),
            Arc::new(NullStore),
            Arc::new(StubAcmeClient { challenge_type }),
            Arc::new(NullCertificateService),
            Arc::new(NullTaskScheduler),
        )
    }

    fn target() -> Target {
        Target::new("example.com", coords("http01"))
    }

    fn pending_authorization(challenge_type: &str, challenge_status: &str) -> Authorization {
        Authorization {
            identifier: "example.com".into(),
            status: "pending".into(),
            challenges: vec![Challenge {
                challenge_type: challenge_type.to_string(),
                url: "https://acme.test/chall/1".into(),
                status: challenge_status.to_string(),
                token: "token".into(),
                error: None,
            }],
        }
    }

    #[tokio::test]
    async fn cached_valid_short_circuits_without_test_mode() {
        let ctx = build_ctx("http-01");
        let driver = AuthorizationDriver::new(&ctx);
        let authorization = Authorization {
            identifier: "example.com".into(),
            status: "valid".into(),
            challenges: vec![],
        };

        let outcome = driver
            .authorize(&target(), &RunOptions::default(), authorization, "http01", false)
            .await;

        assert_eq!(outcome, AuthorizationOutcome::Valid);
    }

    #[tokio::test]
    async fn test_mode_revalidates_even_when_cached_valid() {
        let ctx = build_ctx("http-01");
        let driver = AuthorizationDriver::new(&ctx).with_poll_params(4, Duration::from_millis(1));
        let authorization = Authorization {
            identifier: "example.com".into(),
            status: "valid".into(),
            challenges: vec![Challenge {
                challenge_type: "http-01".into(),
                url: "https://acme.test/chall/1".into(),
                status: "pending".into(),
                token: "token".into(),
                error: None,
            }],
        };

        let outcome = driver
            .authorize(&target(), &RunOptions::default(), authorization, "http01", true)
            .await;

        assert_eq!(outcome, AuthorizationOutcome::Valid);
    }

    #[tokio::test]
    async fn missing_challenge_type_is_invalid() {
        let ctx = build_ctx("dns-01");
        let driver = AuthorizationDriver::new(&ctx);
        let authorization = pending_authorization("dns-01", "pending");

        let outcome = driver
            .authorize(&target(), &RunOptions::default(), authorization, "http01", false)
            .await;

        assert_eq!(
            outcome,
            AuthorizationOutcome::Invalid("expected challenge type not available".into())
        );
    }

    #[tokio::test]
    async fn early_valid_challenge_short_circuits_before_prepare() {
        let ctx = build_ctx("http-01");
        let driver = AuthorizationDriver::new(&ctx);
        let authorization = pending_authorization("http-01", "valid");

        let outcome = driver
            .authorize(&target(), &RunOptions::default(), authorization, "http01", false)
            .await;

        assert_eq!(outcome, AuthorizationOutcome::Valid);
    }

    #[tokio::test]
    async fn unresolvable_validation_plugin_is_invalid() {
        let ctx = build_ctx("http-01");
        let driver = AuthorizationDriver::new(&ctx);
        let authorization = pending_authorization("http-01", "pending");

        // "unknown" has no registered factory, so the Identifier scope
        // itself can't be built and PLUGIN-RESOLVE never runs.
        let outcome = driver
            .authorize(&target(), &RunOptions::default(), authorization, "unknown", false)
            .await;

        assert_eq!(
            outcome,
            AuthorizationOutcome::Invalid("No validation plugin could be selected".into())
        );
    }

    #[tokio::test]
    async fn happy_path_polls_once_then_classifies_valid() {
        let ctx = build_ctx("http-01");
        let driver = AuthorizationDriver::new(&ctx).with_poll_params(4, Duration::from_millis(1));
        let authorization = pending_authorization("http-01", "pending");

        let outcome = driver
            .authorize(&target(), &RunOptions::default(), authorization, "http01", false)
            .await;

        assert_eq!(outcome, AuthorizationOutcome::Valid);
    }
}
