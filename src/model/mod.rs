//! Model identifier tables and the normalization cascade.

use once_cell::sync::Lazy;

/// Canonical identifier returned for "pick anything" requests.
pub const GENERIC_MODEL_ID: &str = "gpt-auto";

/// Family token accepted from providers answering a generic request.
pub const GENERIC_FAMILY_TOKEN: &str = "gpt";

/// Canonical model identifiers, checked by substring containment.
///
/// Declaration order is the tie-break: an identifier that embeds an earlier
/// entry (`gpt-4o-mini` embeds `gpt-4o`) normalizes to that earlier entry.
/// Reordering this list changes matching behavior.
const CANONICAL_MODELS: &[&str] = &[
    "o4-mini",
    "o4-mini-high",
    "o4-mini-deep-research",
    "o3-mini",
    "o3-mini-high",
    "o3",
    "o3-pro",
    "o3-deep-research",
    "o1",
    "o1-pro",
    "o1-preview",
    "o1-mini",
    "gpt-4.5",
    "gpt-4.1",
    "gpt-4.1-mini",
    "gpt-4.1-nano",
    "gpt-4o",
    "gpt-4o-realtime-preview",
    "gpt-4o-transcribe",
    "gpt-4o-search-preview",
    "gpt-4o-audio-preview",
    "chatgpt-4o-latest",
    "gpt-4o-mini",
    "gpt-4o-mini-tts",
    "gpt-4o-mini-realtime-preview",
    "gpt-4o-mini-transcribe",
    "gpt-4o-mini-search-preview",
    "gpt-4o-mini-audio-preview",
    "gpt-4",
    "gpt-4-turbo",
    "gpt-3.5-turbo",
    "computer-use-preview",
    "codex-mini-latest",
    "gpt-image-1",
    "dall-e-3",
    "dall-e-2",
    "tts-1",
    "tts-1-hd",
    "whisper-1",
    "claude-3-opus",
    "claude-4-opus",
    "claude-3-5-sonnet",
    "claude-3-5-haiku",
    "claude-3-7-sonnet",
    "claude-4-sonnet",
    "deepseek-chat",
    "deepseek-reasoner",
    "gpt-auto",
    "microsoft/WizardLM-2-7B",
    "microsoft/WizardLM-2-8x22B",
];

/// Pattern fallbacks for decorated variants the canonical table misses.
///
/// Evaluated in order, first match wins. The final `auto` entry is the
/// generic wildcard rule.
const FALLBACK_RULES: &[(&str, &str)] = &[
    ("gpt-4o-plus", "gpt-4o"),
    ("gpt-4o-2024", "gpt-4o"),
    ("deepseek-r1", "deepseek-reasoner"),
    ("gpt-4-gizmo", "gpt-4-unofficial"),
    ("o1-2024-12-17", "o1-preview"),
    ("Llama-3.1-405B", "meta-llama/Meta-Llama-3.1-405B-Instruct"),
    ("Llama-3.1-70B", "meta-llama/Meta-Llama-3.1-70B-Instruct"),
    ("Llama-3.1-8B", "meta-llama/Meta-Llama-3.1-8B-Instruct"),
    ("Llama-3.3-70B", "meta-llama/Meta-Llama-3.3-70B-Instruct"),
    ("auto", GENERIC_MODEL_ID),
];

/// Models probed by default against the Deep.Assistant API.
pub const DEFAULT_PROBE_MODELS: &[&str] = &[
    "o3-mini",
    "o1-preview",
    "o1-mini",
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-3.5-turbo",
    "gpt-auto",
    "claude-3-opus",
    "claude-3-5-sonnet",
    "claude-3-5-haiku",
    "claude-3-7-sonnet",
    "deepseek-chat",
    "deepseek-reasoner",
];

/// Models probed by default against OpenRouter.
pub const OPENROUTER_PROBE_MODELS: &[&str] = &[
    // Frontier reasoning
    "openai/gpt-5-pro",
    "openai/gpt-5.1",
    "anthropic/claude-opus-4.5",
    "anthropic/claude-sonnet-4.5",
    "anthropic/claude-haiku-4.5",
    // Coding
    "openai/gpt-5.1-codex",
    "kwaipilot/kat-coder-pro:free",
    // Advanced reasoning
    "deepseek/deepseek-v3.2",
    "google/gemini-3-pro-preview",
    "google/gemini-2.5-flash-preview-09-2025",
    "moonshotai/kimi-k2-thinking",
    // Multimodal vision
    "z-ai/glm-4.6v",
    "qwen/qwen3-vl-235b-a22b-instruct",
    "nvidia/nemotron-nano-12b-v2-vl",
    // Efficient/open
    "mistralai/mistral-large-2512",
    "mistralai/ministral-14b-2512",
    "amazon/nova-2-lite-v1:free",
    "allenai/olmo-3-32b-think:free",
    // Specialized/research
    "perplexity/sonar-pro-search",
    "prime-intellect/intellect-3",
    "minimax/minimax-m2",
    "x-ai/grok-4.1-fast",
    // Legacy/popular
    "openai/gpt-4o",
    "openai/gpt-4o-mini",
    "anthropic/claude-3.5-sonnet",
    "anthropic/claude-3-opus",
    "google/gemini-pro",
    "meta-llama/llama-3.3-70b-instruct",
    "deepseek/deepseek-chat",
    "qwen/qwen-2.5-72b-instruct",
];

static BUILTIN_TABLE: Lazy<ModelTable> = Lazy::new(|| {
    ModelTable::new(
        CANONICAL_MODELS.iter().map(|id| (*id).to_owned()),
        FALLBACK_RULES
            .iter()
            .map(|(marker, id)| ((*marker).to_owned(), (*id).to_owned())),
    )
});

/// Ordered, immutable rule set mapping raw model strings to canonical ids.
#[derive(Debug, Clone)]
pub struct ModelTable {
    canonical: Vec<String>,
    fallback: Vec<(String, String)>,
}

impl ModelTable {
    pub fn new(
        canonical: impl IntoIterator<Item = String>,
        fallback: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            canonical: canonical.into_iter().collect(),
            fallback: fallback.into_iter().collect(),
        }
    }

    /// The process-wide default rule set.
    pub fn builtin() -> &'static ModelTable {
        &BUILTIN_TABLE
    }

    /// Maps a raw, possibly decorated model string to its canonical id.
    ///
    /// Canonical entries are tried first by substring containment, then the
    /// fallback patterns, in declaration order; `None` means unrecognized,
    /// which callers treat as "compare raw strings", not as an error.
    pub fn normalize(&self, raw: &str) -> Option<&str> {
        if raw.is_empty() {
            return None;
        }
        for id in &self.canonical {
            if raw.contains(id.as_str()) {
                return Some(id.as_str());
            }
        }
        for (marker, id) in &self.fallback {
            if raw.contains(marker.as_str()) {
                return Some(id.as_str());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ids_map_to_themselves() {
        let table = ModelTable::builtin();
        assert_eq!(table.normalize("gpt-4o"), Some("gpt-4o"));
        assert_eq!(table.normalize("claude-3-opus"), Some("claude-3-opus"));
        assert_eq!(table.normalize("deepseek-chat"), Some("deepseek-chat"));
    }

    #[test]
    fn dated_snapshot_maps_to_base_id() {
        let table = ModelTable::builtin();
        assert_eq!(table.normalize("gpt-4o-2024-11-20"), Some("gpt-4o"));
    }

    #[test]
    fn fallback_patterns_apply_after_the_table() {
        let table = ModelTable::builtin();
        assert_eq!(
            table.normalize("deepseek-r1-distill"),
            Some("deepseek-reasoner")
        );
        assert_eq!(
            table.normalize("Llama-3.1-405B-Instruct-Turbo"),
            Some("meta-llama/Meta-Llama-3.1-405B-Instruct")
        );
    }

    #[test]
    fn generic_wildcard_maps_to_auto() {
        let table = ModelTable::builtin();
        assert_eq!(table.normalize("router-auto"), Some(GENERIC_MODEL_ID));
        assert_eq!(table.normalize("gpt-auto"), Some(GENERIC_MODEL_ID));
    }

    #[test]
    fn unrecognized_input_is_none_not_an_error() {
        let table = ModelTable::builtin();
        assert_eq!(table.normalize("grok-1"), None);
        assert_eq!(table.normalize(""), None);
    }

    #[test]
    fn declaration_order_is_the_tie_break() {
        // `gpt-4o` precedes `gpt-4o-mini`, so the longer id resolves to the
        // shorter one. Both sides of a comparison normalize the same way, so
        // verdicts stay consistent; the ordering itself is load-bearing.
        let table = ModelTable::builtin();
        assert_eq!(table.normalize("gpt-4o-mini"), Some("gpt-4o"));
        assert_eq!(table.normalize("gpt-4-turbo"), Some("gpt-4"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let table = ModelTable::builtin();
        let mut inputs: Vec<&str> = CANONICAL_MODELS.to_vec();
        inputs.extend(FALLBACK_RULES.iter().map(|(marker, _)| *marker));
        for input in inputs {
            if let Some(first) = table.normalize(input) {
                let first = first.to_owned();
                assert_eq!(
                    table.normalize(&first),
                    Some(first.as_str()),
                    "normalize is not idempotent for `{input}`"
                );
            }
        }
    }

    #[test]
    fn custom_tables_follow_injected_order() {
        let table = ModelTable::new(
            ["alpha".to_owned(), "alpha-large".to_owned()],
            [("legacy".to_owned(), "alpha".to_owned())],
        );
        assert_eq!(table.normalize("alpha-large"), Some("alpha"));
        assert_eq!(table.normalize("legacy-v2"), Some("alpha"));
        assert_eq!(table.normalize("beta"), None);
    }
}
