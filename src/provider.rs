//! Provider presets: endpoints, credentials, default model lists.

use clap::ValueEnum;

use crate::classify::MatchPolicy;
use crate::model;

const DEEP_ASSISTANT_ENDPOINT: &str = "https://api.deep.assistant.run.place/v1";
const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Identification headers OpenRouter asks integrations to send. Optional and
/// non-functional to the probe outcome.
const OPENROUTER_HEADERS: &[(&str, &str)] = &[
    ("http-referer", "https://github.com/link-assistant/modelprobe"),
    ("x-title", "modelprobe"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Deep.Assistant chat-completion API.
    DeepAssistant,
    /// OpenRouter aggregation API.
    Openrouter,
}

/// Everything that differs between supported providers.
#[derive(Debug, Clone, Copy)]
pub struct ProviderProfile {
    pub default_endpoint: &'static str,
    pub endpoint_env: &'static str,
    pub api_key_env: &'static str,
    pub default_models: &'static [&'static str],
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub match_policy: MatchPolicy,
}

const DEEP_ASSISTANT_PROFILE: ProviderProfile = ProviderProfile {
    default_endpoint: DEEP_ASSISTANT_ENDPOINT,
    endpoint_env: "OPENAI_API_BASE",
    api_key_env: "OPENAI_API_KEY",
    default_models: model::DEFAULT_PROBE_MODELS,
    extra_headers: &[],
    match_policy: MatchPolicy::Normalized,
};

const OPENROUTER_PROFILE: ProviderProfile = ProviderProfile {
    default_endpoint: OPENROUTER_ENDPOINT,
    endpoint_env: "OPENROUTER_API_BASE",
    api_key_env: "OPENROUTER_API_KEY",
    default_models: model::OPENROUTER_PROBE_MODELS,
    extra_headers: OPENROUTER_HEADERS,
    match_policy: MatchPolicy::SlashSuffix,
};

impl Provider {
    pub fn profile(self) -> &'static ProviderProfile {
        match self {
            Provider::DeepAssistant => &DEEP_ASSISTANT_PROFILE,
            Provider::Openrouter => &OPENROUTER_PROFILE,
        }
    }
}
