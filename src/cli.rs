use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::error::SetupError;
use crate::provider::{Provider, ProviderProfile};
use crate::session::SessionConfig;

/// Command-line options for the model availability checker.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Chat-completion model availability checker", long_about = None)]
pub struct CliArgs {
    /// Model identifiers to probe; defaults to the provider's built-in list.
    #[arg(value_name = "MODEL")]
    pub models: Vec<String>,

    /// Provider preset (endpoint, credentials, default models, match rule).
    #[arg(long = "provider", value_enum, default_value_t = Provider::DeepAssistant)]
    pub provider: Provider,

    /// Base URL of the chat-completion API; overrides the provider default.
    #[arg(long = "endpoint", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Bearer API key; falls back to the provider's environment variable.
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Network timeout (seconds) applied to each probe request.
    #[arg(long = "timeout", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=300))]
    timeout_secs: u64,

    /// Cap on probes in flight at once; the default launches the whole list.
    #[arg(long = "concurrency", value_name = "N", value_parser = clap::value_parser!(u64).range(1..=256))]
    concurrency: Option<u64>,

    /// Print the summary as JSON instead of the human-readable report.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    pub json: bool,

    /// File to append `key=value` summary lines to (GitHub Actions output).
    #[arg(long = "summary-file", value_name = "PATH", env = "GITHUB_OUTPUT")]
    pub summary_file: Option<PathBuf>,
}

impl CliArgs {
    /// Returns the configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency.map(|n| n as usize)
    }

    /// Models to probe: explicit arguments, else the provider default list.
    pub fn resolve_models(&self, profile: &ProviderProfile) -> Vec<String> {
        if self.models.is_empty() {
            profile
                .default_models
                .iter()
                .map(|model| (*model).to_owned())
                .collect()
        } else {
            self.models.clone()
        }
    }

    /// Convert CLI arguments into a session configuration.
    pub fn session_config(
        &self,
        profile: &ProviderProfile,
    ) -> std::result::Result<SessionConfig, SetupError> {
        Ok(SessionConfig {
            endpoint: self.resolve_endpoint(profile),
            api_key: self.resolve_api_key(profile)?,
            timeout: self.timeout(),
            extra_headers: profile.extra_headers,
        })
    }

    fn resolve_api_key(
        &self,
        profile: &ProviderProfile,
    ) -> std::result::Result<String, SetupError> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        env::var(profile.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(SetupError::MissingApiKey(profile.api_key_env))
    }

    fn resolve_endpoint(&self, profile: &ProviderProfile) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        env::var(profile.endpoint_env)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| profile.default_endpoint.to_owned())
    }
}
