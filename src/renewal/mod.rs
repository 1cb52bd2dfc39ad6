//! Automatic certificate renewal.
//!
//! Two tiers live here: a lightweight expiry-driven [`simple::SimpleRenewalScheduler`]
//! for callers that just want "keep these domain sets renewed", and the full
//! plugin-driven renewal engine (C1-C7) for callers that need target
//! selection, a persisted registry of scheduled renewals, per-identifier
//! authorization, and a selectable installation pipeline: [`acme`],
//! [`authorization`], [`driver`], [`plugin`], [`registry`], [`scope`],
//! [`target`], and the due-date scan in [`scheduler`].
pub mod acme;
pub mod authorization;
pub mod driver;
pub mod error;
pub mod plugin;
pub mod registry;
pub mod scheduler;
pub mod scope;
pub mod simple;
pub mod target;

pub use acme::{AcmeClientWrapper, Authorization, Challenge, LiveAcmeClient, Order};
pub use authorization::{AuthorizationDriver, AuthorizationOutcome};
pub use driver::{RenewalDriver, RenewalLifecycleHook};
pub use error::{RenewalError, Result as RenewalResult};
pub use plugin::{
    CertificateService, ChallengeDetails, ConfirmationPrompt, InstallationPlugin,
    InstallationPluginFactory, LoggingTaskScheduler, NullConfirmation,
    NullInstallationPlugin, NullInstallationPluginFactory, NullTargetPlugin, PluginRegistry,
    PluginSelection, StorePlugin, TargetPlugin, TaskScheduler, ValidationPlugin,
    ValidationPluginFactory,
};
pub use registry::{CertRecord, RenewResult, RenewalRegistry, ScheduledRenewal};
pub use scheduler::SchedulerLoop;
pub use scope::{IdentifierContext, RenewalContext};
pub use simple::{RenewalHook, SimpleRenewalScheduler};
pub use target::{
    InstallationParameters, PluginCoordinates, RunLevel, RunOptions, Target,
    concatenated_alternative_names, union_hosts,
};
