/// Target (binding) selection and sub-target splitting
use serde::{Deserialize, Serialize};

/// Plugin coordinates bound to a target: which target/validation plugin
/// produced it, and (for validation) which challenge type it answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginCoordinates {
    /// Name of the target plugin that produced this binding.
    pub target_plugin: String,
    /// Name of the validation plugin.
    pub validation_plugin: String,
    /// Challenge type the validation plugin answers (e.g. "http-01").
    pub challenge_type: String,
}

impl PluginCoordinates {
    pub fn is_empty(&self) -> bool {
        self.target_plugin.is_empty() || self.validation_plugin.is_empty()
    }
}

/// Optional installation parameters carried on a target.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallationParameters {
    pub ssl_port: Option<u16>,
    pub ssl_ip_address: Option<String>,
    pub validation_port: Option<u16>,
}

/// The certificate subject description: a primary host, alternative names,
/// and the plugin coordinates that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub primary_host: String,
    pub alternative_names: Vec<String>,
    pub plugin: PluginCoordinates,
    pub installation: InstallationParameters,
}

impl Target {
    pub fn new(primary_host: impl Into<String>, plugin: PluginCoordinates) -> Self {
        Self {
            primary_host: primary_host.into(),
            alternative_names: Vec::new(),
            plugin,
            installation: InstallationParameters::default(),
        }
    }

    pub fn with_alternative_names(mut self, names: Vec<String>) -> Self {
        self.alternative_names = names;
        self
    }

    /// Two targets share identity when they describe the same binding: same
    /// primary host and same plugin coordinates. Used by the renewal registry
    /// to find/replace records — not full structural equality, since
    /// `alternative_names` may legitimately drift between runs.
    pub fn same_identity(&self, other: &Target) -> bool {
        self.primary_host == other.primary_host && self.plugin == other.plugin
    }

    /// The set of hosts this target covers. When `include_primary_only` is
    /// true, only the primary host is returned; otherwise the primary host
    /// and every alternative name are returned, deduplicated.
    pub fn get_hosts(&self, include_primary_only: bool) -> Vec<String> {
        if include_primary_only {
            return vec![self.primary_host.clone()];
        }
        let mut hosts = Vec::with_capacity(1 + self.alternative_names.len());
        hosts.push(self.primary_host.clone());
        for name in &self.alternative_names {
            if !hosts.contains(name) {
                hosts.push(name.clone());
            }
        }
        hosts
    }
}

/// Distinct union of `get_hosts(false)` across a set of sub-targets, in
/// first-seen order. This is the identifier set placed on the ACME order.
pub fn union_hosts(sub_targets: &[Target]) -> Vec<String> {
    let mut union = Vec::new();
    for sub in sub_targets {
        for host in sub.get_hosts(false) {
            if !union.contains(&host) {
                union.push(host);
            }
        }
    }
    union
}

/// Alternative names across sub-targets, concatenated (not deduplicated
/// against the primary host), matching the renewal driver's step 2: the
/// refreshed binding's `alternative_names` is the concatenation of each
/// sub-target's own alternative names.
pub fn concatenated_alternative_names(sub_targets: &[Target]) -> Vec<String> {
    let mut out = Vec::new();
    for sub in sub_targets {
        out.extend(sub.alternative_names.iter().cloned());
    }
    out
}

/// Run level under which a plugin is being selected or acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLevel {
    Unattended,
    Interactive,
}

/// The subset of CLI-observed option fields the renewal engine consumes
/// directly (§6). Parsing and binding those options from argv is out of
/// scope here.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub renew: bool,
    pub force_renewal: bool,
    pub plugin: Option<String>,
    pub cancel: bool,
    pub validation: Option<String>,
    pub validation_mode: Option<String>,
    pub installation: Vec<String>,
    pub script: Option<String>,
    pub script_parameters: Option<String>,
    pub central_ssl_store: Option<String>,
    pub certificate_store: Option<String>,
    pub keep_existing: Option<bool>,
    pub warmup: bool,
    pub test: bool,
    pub close_on_finish: bool,
    pub ssl_port: Option<u16>,
    pub ssl_ip_address: Option<String>,
    pub validation_port: Option<u16>,
    pub no_task_scheduler: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(target: &str, validation: &str, challenge: &str) -> PluginCoordinates {
        PluginCoordinates {
            target_plugin: target.into(),
            validation_plugin: validation.into(),
            challenge_type: challenge.into(),
        }
    }

    #[test]
    fn get_hosts_excludes_alternatives_when_primary_only() {
        let target = Target::new("example.com", coords("manual", "http01", "http-01"))
            .with_alternative_names(vec!["www.example.com".into()]);
        assert_eq!(target.get_hosts(true), vec!["example.com".to_string()]);
        assert_eq!(
            target.get_hosts(false),
            vec!["example.com".to_string(), "www.example.com".to_string()]
        );
    }

    #[test]
    fn union_hosts_deduplicates_across_sub_targets() {
        let a = Target::new("example.com", coords("manual", "http01", "http-01"))
            .with_alternative_names(vec!["a.example.com".into()]);
        let b = Target::new("example.com", coords("manual", "http01", "http-01"))
            .with_alternative_names(vec!["a.example.com".into(), "b.example.com".into()]);
        let union = union_hosts(&[a, b]);
        assert_eq!(
            union,
            vec![
                "example.com".to_string(),
                "a.example.com".to_string(),
                "b.example.com".to_string()
            ]
        );
    }

    #[test]
    fn same_identity_ignores_alternative_names() {
        let a = Target::new("example.com", coords("manual", "http01", "http-01"));
        let b = Target::new("example.com", coords("manual", "http01", "http-01"))
            .with_alternative_names(vec!["extra.example.com".into()]);
        assert!(a.same_identity(&b));

        let c = Target::new("example.com", coords("manual", "dns01", "dns-01"));
        assert!(!a.same_identity(&c));
    }
}
