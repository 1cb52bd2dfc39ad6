/// Plugin contracts and registry (C1): target, validation, store, and
/// installation plugins are each reached through a narrow async trait; the
/// registry resolves a factory by name (unattended) or records an
/// interactive choice, distinguishing "nothing available" from "user
/// cancelled" via `PluginSelection`.
use super::error::Result;
use super::registry::CertRecord;
use super::target::{RunLevel, RunOptions, Target};
use async_trait::async_trait;
use std::sync::Arc;

/// Opaque data the ACME client hands the validation plugin so it can
/// construct its proof (a key authorization, a DNS record value, …).
#[derive(Debug, Clone)]
pub struct ChallengeDetails {
    pub token: String,
    pub key_authorization: String,
}

/// Produces and refreshes Targets, and splits one into sub-targets.
#[async_trait]
pub trait TargetPlugin: Send + Sync {
    fn name(&self) -> &str;

    async fn default(&self, options: &RunOptions) -> Option<Target>;

    async fn acquire(&self, options: &RunOptions, run_level: RunLevel) -> Option<Target>;

    /// Re-derive the target from its source of truth (host enumeration may
    /// have changed since it was scheduled). `None` means the target no
    /// longer exists.
    async fn refresh(&self, target: &Target) -> Option<Target>;

    /// Split a target into sub-targets, each carrying a subset of hosts.
    /// The default implementation returns the target unsplit.
    fn split(&self, target: &Target) -> Vec<Target> {
        vec![target.clone()]
    }

    fn get_hosts(&self, target: &Target, include_primary_only: bool) -> Vec<String> {
        target.get_hosts(include_primary_only)
    }
}

/// Prepares domain-control proof for one identifier. Scoped: released when
/// the owning Identifier scope exits.
#[async_trait]
pub trait ValidationPlugin: Send + Sync {
    async fn prepare_challenge(&mut self, details: &ChallengeDetails) -> Result<()>;

    /// Release any prepared artifact (file, DNS record, listener). Called on
    /// every scope exit path, including timeout and error.
    async fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Describes a validation mechanism and constructs instances of it.
#[async_trait]
pub trait ValidationPluginFactory: Send + Sync {
    fn name(&self) -> &str;
    fn challenge_type(&self) -> &str;
    fn can_validate(&self, target: &Target) -> bool;

    async fn default(&self, target: &Target, options: &RunOptions) -> Option<()>;

    async fn acquire(
        &self,
        target: &Target,
        options: &RunOptions,
        run_level: RunLevel,
    ) -> Result<Box<dyn ValidationPlugin>>;
}

/// Persists issued certificates and looks them up by thumbprint.
#[async_trait]
pub trait StorePlugin: Send + Sync {
    async fn find_by_thumbprint(&self, thumbprint: &str) -> Result<Option<CertRecord>>;
    async fn save(&self, record: CertRecord) -> Result<()>;
    async fn delete(&self, record: &CertRecord) -> Result<()>;
}

/// Installs a new certificate into some application or store.
#[async_trait]
pub trait InstallationPlugin: Send + Sync {
    async fn install(&self, new: &CertRecord, old: Option<&CertRecord>) -> Result<()>;
}

/// Describes an installation mechanism and constructs instances of it.
#[async_trait]
pub trait InstallationPluginFactory: Send + Sync {
    fn name(&self) -> &str;

    async fn default(&self, options: &RunOptions) -> Option<()>;
    async fn acquire(&self, options: &RunOptions, run_level: RunLevel) -> Result<()>;

    fn instance(&self) -> Box<dyn InstallationPlugin>;
}

/// Requests certificate issuance given a target and an order. Expected to
/// cache by public-key/subject hash so reissues within a short window reuse
/// bytes, but the caching policy itself is an implementation detail of the
/// concrete service, not of this contract.
#[async_trait]
pub trait CertificateService: Send + Sync {
    async fn request_certificate(
        &self,
        target: &Target,
        order: &super::acme::Order,
    ) -> Result<Option<CertRecord>>;
}

/// Ensures the OS-level scheduled task exists.
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    async fn ensure_task_scheduler(&self) -> Result<()>;
}

/// The narrow collaborator interactive menu navigation is reached through:
/// a single yes/no prompt, used by the renewal driver's test-mode gates
/// (§4.6 steps 6 and 10). Unattended runs never call through to a real
/// prompt — `NullConfirmation` answers every question affirmatively, which
/// is what "Unattended" means for a flow that would otherwise pause.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, question: &str) -> bool;
}

/// Always answers yes: the unattended default.
pub struct NullConfirmation;

#[async_trait]
impl ConfirmationPrompt for NullConfirmation {
    async fn confirm(&self, _question: &str) -> bool {
        true
    }
}

/// Default `TaskScheduler`: OS-level scheduled-task creation is out of
/// scope for this core (§1), so the bundled implementation just logs the
/// intent. A host application wires in a real one (`schtasks`, systemd
/// timers, cron) by implementing the trait.
pub struct LoggingTaskScheduler;

#[async_trait]
impl TaskScheduler for LoggingTaskScheduler {
    async fn ensure_task_scheduler(&self) -> Result<()> {
        tracing::info!("scheduled task creation is delegated to the host application");
        Ok(())
    }
}

/// Distinguishes "no factory matched" from "the user cancelled selection".
pub enum PluginSelection<T> {
    Selected(T),
    Cancelled,
    Unavailable,
}

impl<T> PluginSelection<T> {
    pub fn selected(self) -> Option<T> {
        match self {
            PluginSelection::Selected(value) => Some(value),
            _ => None,
        }
    }
}

/// The always-present null target plugin: models "no plugin could be
/// selected" rather than ever producing a usable Target.
pub struct NullTargetPlugin;

#[async_trait]
impl TargetPlugin for NullTargetPlugin {
    fn name(&self) -> &str {
        "null"
    }

    async fn default(&self, _options: &RunOptions) -> Option<Target> {
        None
    }

    async fn acquire(&self, _options: &RunOptions, _run_level: RunLevel) -> Option<Target> {
        None
    }

    async fn refresh(&self, _target: &Target) -> Option<Target> {
        None
    }
}

/// The always-present null installer: guarantees a non-empty installation
/// list on success, and models "do nothing" installation.
pub struct NullInstallationPlugin;

#[async_trait]
impl InstallationPlugin for NullInstallationPlugin {
    async fn install(&self, _new: &CertRecord, _old: Option<&CertRecord>) -> Result<()> {
        Ok(())
    }
}

pub struct NullInstallationPluginFactory;

#[async_trait]
impl InstallationPluginFactory for NullInstallationPluginFactory {
    fn name(&self) -> &str {
        "null"
    }

    async fn default(&self, _options: &RunOptions) -> Option<()> {
        Some(())
    }

    async fn acquire(&self, _options: &RunOptions, _run_level: RunLevel) -> Result<()> {
        Ok(())
    }

    fn instance(&self) -> Box<dyn InstallationPlugin> {
        Box::new(NullInstallationPlugin)
    }
}

/// Enumerates and resolves plugin factories by name (unattended) or by
/// interactive choice. Four independent families; each behaves the same way
/// with respect to selection policy.
#[derive(Default)]
pub struct PluginRegistry {
    target_plugins: Vec<Arc<dyn TargetPlugin>>,
    validation_factories: Vec<Arc<dyn ValidationPluginFactory>>,
    store_plugins: Vec<Arc<dyn StorePlugin>>,
    installation_factories: Vec<Arc<dyn InstallationPluginFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_target(&mut self, plugin: Arc<dyn TargetPlugin>) {
        self.target_plugins.push(plugin);
    }

    pub fn register_validation(&mut self, factory: Arc<dyn ValidationPluginFactory>) {
        self.validation_factories.push(factory);
    }

    pub fn register_store(&mut self, plugin: Arc<dyn StorePlugin>) {
        self.store_plugins.push(plugin);
    }

    pub fn register_installation(&mut self, factory: Arc<dyn InstallationPluginFactory>) {
        self.installation_factories.push(factory);
    }

    /// Unattended resolution: case-insensitive name match. No match yields
    /// `Unavailable` — the caller surfaces `RenewalError::plugin_unavailable`.
    pub fn resolve_target(&self, name: &str) -> PluginSelection<Arc<dyn TargetPlugin>> {
        match self
            .target_plugins
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
        {
            Some(plugin) => PluginSelection::Selected(plugin.clone()),
            None => PluginSelection::Unavailable,
        }
    }

    /// Resolve a validation factory by name, qualified by the target it must
    /// be able to validate.
    pub fn resolve_validation(
        &self,
        name: &str,
        target: &Target,
    ) -> PluginSelection<Arc<dyn ValidationPluginFactory>> {
        match self
            .validation_factories
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name) && f.can_validate(target))
        {
            Some(factory) => PluginSelection::Selected(factory.clone()),
            None => PluginSelection::Unavailable,
        }
    }

    /// Resolve a validation factory purely by the challenge type it answers
    /// (used by the authorization driver's CHALLENGE-SELECT step when the
    /// renewal's plugin coordinates already pin the challenge type).
    pub fn validation_by_challenge_type(
        &self,
        challenge_type: &str,
    ) -> Option<Arc<dyn ValidationPluginFactory>> {
        self.validation_factories
            .iter()
            .find(|f| f.challenge_type() == challenge_type)
            .cloned()
    }

    pub fn resolve_store(&self, name: &str) -> PluginSelection<Arc<dyn StorePlugin>> {
        // Store plugins are not named per-instance in this registry; the
        // single configured store is what's registered.
        let _ = name;
        match self.store_plugins.first() {
            Some(plugin) => PluginSelection::Selected(plugin.clone()),
            None => PluginSelection::Unavailable,
        }
    }

    /// Resolve a list of installation factories. An empty `names` list with
    /// at least one registered factory models user cancellation (per §4.1:
    /// "an empty list signals user cancellation").
    pub fn resolve_installations(
        &self,
        names: &[String],
    ) -> PluginSelection<Vec<Arc<dyn InstallationPluginFactory>>> {
        if names.is_empty() {
            return PluginSelection::Cancelled;
        }
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            match self
                .installation_factories
                .iter()
                .find(|f| f.name().eq_ignore_ascii_case(name))
            {
                Some(factory) => resolved.push(factory.clone()),
                None => return PluginSelection::Unavailable,
            }
        }
        PluginSelection::Selected(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedTargetPlugin(&'static str);

    #[async_trait]
    impl TargetPlugin for NamedTargetPlugin {
        fn name(&self) -> &str {
            self.0
        }
        async fn default(&self, _options: &RunOptions) -> Option<Target> {
            None
        }
        async fn acquire(&self, _options: &RunOptions, _run_level: RunLevel) -> Option<Target> {
            None
        }
        async fn refresh(&self, _target: &Target) -> Option<Target> {
            None
        }
    }

    #[test]
    fn resolve_target_matches_case_insensitively() {
        let mut registry = PluginRegistry::new();
        registry.register_target(Arc::new(NamedTargetPlugin("Manual")));

        assert!(registry.resolve_target("manual").selected().is_some());
        assert!(registry.resolve_target("MANUAL").selected().is_some());
    }

    #[test]
    fn resolve_target_unavailable_when_no_name_matches() {
        let mut registry = PluginRegistry::new();
        registry.register_target(Arc::new(NamedTargetPlugin("manual")));

        match registry.resolve_target("ftp") {
            PluginSelection::Unavailable => {}
            _ => panic!("expected Unavailable for an unregistered plugin name"),
        }
    }

    #[test]
    fn resolve_installations_empty_names_is_cancelled() {
        let mut registry = PluginRegistry::new();
        registry.register_installation(Arc::new(NullInstallationPluginFactory));

        match registry.resolve_installations(&[]) {
            PluginSelection::Cancelled => {}
            _ => panic!("an empty installation list must model user cancellation"),
        }
    }

    #[test]
    fn resolve_installations_unknown_name_is_unavailable() {
        let mut registry = PluginRegistry::new();
        registry.register_installation(Arc::new(NullInstallationPluginFactory));

        match registry.resolve_installations(&["does-not-exist".to_string()]) {
            PluginSelection::Unavailable => {}
            _ => panic!("an unresolvable name must be Unavailable, not silently dropped"),
        }
    }

    #[test]
    fn resolve_installations_resolves_every_name_in_order() {
        let mut registry = PluginRegistry::new();
        registry.register_installation(Arc::new(NullInstallationPluginFactory));

        let selected = registry
            .resolve_installations(&["null".to_string()])
            .selected()
            .expect("null installer is always registered in this test");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "null");
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
            unimplemented!("not exercised by registry-resolution tests")
        }
    }

    #[test]
    fn validation_by_challenge_type_ignores_name() {
        let mut registry = PluginRegistry::new();
        registry.register_validation(Arc::new(Http01Factory));

        let factory = registry
            .validation_by_challenge_type("http-01")
            .expect("registered http-01 factory must be found by challenge type");
        assert_eq!(factory.name(), "http01");
        assert!(registry.validation_by_challenge_type("dns-01").is_none());
    }

    #[test]
    fn resolve_store_ignores_name_and_returns_single_configured_store() {
        struct NoopStore;
        #[async_trait]
        impl StorePlugin for NoopStore {
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

        let mut registry = PluginRegistry::new();
        registry.register_store(Arc::new(NoopStore));

        assert!(registry.resolve_store("anything").selected().is_some());
        assert!(PluginRegistry::new().resolve_store("anything").selected().is_none());
    }
}
