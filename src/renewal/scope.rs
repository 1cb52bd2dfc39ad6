/// Scope factory (C3): binds the selected plugins and shared services for
/// one renewal attempt, and a nested scope for one identifier within it.
/// Rust ownership gives scope-exit release for free in the common case;
/// the Identifier scope additionally exposes an explicit async `release()`
/// because challenge cleanup is fallible I/O a `Drop` impl cannot await, and
/// it must run on every exit path including timeout and error.
use super::acme::AcmeClientWrapper;
use super::error::Result;
use super::plugin::{
    CertificateService, ConfirmationPrompt, NullConfirmation, PluginRegistry, StorePlugin,
    TaskScheduler, ValidationPlugin,
};
use super::target::{RunLevel, Target};
use std::sync::Arc;

/// Per-renewal context: the plugins and services selected for one
/// `ScheduledRenewal`.
pub struct RenewalContext {
    pub run_level: RunLevel,
    pub registry: Arc<PluginRegistry>,
    pub store: Arc<dyn StorePlugin>,
    pub acme_client: Arc<dyn AcmeClientWrapper>,
    pub certificate_service: Arc<dyn CertificateService>,
    pub task_scheduler: Arc<dyn TaskScheduler>,
    pub confirm: Arc<dyn ConfirmationPrompt>,
}

impl RenewalContext {
    pub fn new(
        run_level: RunLevel,
        registry: Arc<PluginRegistry>,
        store: Arc<dyn StorePlugin>,
        acme_client: Arc<dyn AcmeClientWrapper>,
        certificate_service: Arc<dyn CertificateService>,
        task_scheduler: Arc<dyn TaskScheduler>,
    ) -> Self {
        Self {
            run_level,
            registry,
            store,
            acme_client,
            certificate_service,
            task_scheduler,
            confirm: Arc::new(NullConfirmation),
        }
    }

    /// Override the confirmation collaborator (e.g. for an interactive run).
    pub fn with_confirmation(mut self, confirm: Arc<dyn ConfirmationPrompt>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Build a nested scope for one DNS identifier within `target`, with a
    /// validation plugin instance specialized for it.
    pub async fn identifier_scope(
        &self,
        target: &Target,
        identifier: &str,
        validation_name: &str,
    ) -> Result<IdentifierContext> {
        let factory = self
            .registry
            .resolve_validation(validation_name, target)
            .selected()
            .ok_or_else(|| {
                super::error::RenewalError::plugin_unavailable("validation")
            })?;

        Ok(IdentifierContext {
            identifier: identifier.to_string(),
            validation_plugin: None,
            challenge_type: factory.challenge_type().to_string(),
            factory,
        })
    }
}

/// Nested scope for one identifier: carries the validation plugin factory
/// and — once resolved — the live instance that must be released on exit.
pub struct IdentifierContext {
    pub identifier: String,
    pub challenge_type: String,
    factory: Arc<dyn super::plugin::ValidationPluginFactory>,
    validation_plugin: Option<Box<dyn ValidationPlugin>>,
}

impl IdentifierContext {
    pub async fn resolve_plugin(
        &mut self,
        target: &Target,
        options: &super::target::RunOptions,
        run_level: RunLevel,
    ) -> Result<()> {
        let plugin = self.factory.acquire(target, options, run_level).await?;
        self.validation_plugin = Some(plugin);
        Ok(())
    }

    pub fn plugin_mut(&mut self) -> Option<&mut Box<dyn ValidationPlugin>> {
        self.validation_plugin.as_mut()
    }

    /// Release the prepared challenge artifact. Must be called on every exit
    /// path — success, invalid, timeout, or error — before the scope ends.
    pub async fn release(&mut self) -> Result<()> {
        if let Some(plugin) = self.validation_plugin.as_mut() {
            plugin.release().await?;
        }
        Ok(())
    }
}
