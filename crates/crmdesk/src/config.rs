//! CLI configuration -- thin wrapper around `crmdesk_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--backend, --username, --insecure, --timeout).

use std::time::Duration;

use crmdesk_core::BackendConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use crmdesk_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Translate a `Profile` + global flags into a `BackendConfig`.
///
/// CLI flag overrides take priority over profile values, which take
/// priority over `[defaults]`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<BackendConfig, CliError> {
    // 1. Backend URL (flag > env > profile)
    let url_str = global.backend.as_deref().unwrap_or(&profile.backend);
    let url = crmdesk_config::parse_backend_url(url_str)?;

    // 2. Credentials
    let username = match &global.username {
        Some(user) => user.clone(),
        None => crmdesk_config::resolve_username(profile, profile_name)?,
    };
    let password = crmdesk_config::resolve_password(profile, profile_name)?;

    // 3. TLS verification
    let insecure = global.insecure || profile.insecure.unwrap_or(defaults.insecure);
    let tls = crmdesk_config::tls_verification(insecure, profile.ca_cert.as_deref());

    // 4. Timeout
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );

    Ok(BackendConfig {
        url,
        username,
        password,
        tls,
        timeout,
    })
}

/// Build a `BackendConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--backend` plus env credentials suffice.
pub fn build_backend_config(global: &GlobalOpts, cfg: &Config) -> Result<BackendConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    let backend = global.backend.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let adhoc = Profile {
        backend,
        ..Profile::default()
    };
    resolve_profile(&adhoc, &profile_name, &cfg.defaults, global)
}
