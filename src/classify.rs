//! Turns raw probe outcomes into per-model verdicts.

use serde::Serialize;

use crate::model::{self, ModelTable};
use crate::probe::ProbeOutcome;

/// How a vendor-reported model is matched against the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Normalize both sides through the rule cascade; unrecognized ids fall
    /// back to raw string equality. A `gpt-auto` request accepts any vendor
    /// model carrying the family token.
    Normalized,
    /// Exact match, or the vendor model contains the slash-suffix of the
    /// requested id (`openai/gpt-4o` matches anything containing `gpt-4o`).
    /// Weaker than the cascade; kept for OpenRouter.
    SlashSuffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbeStatus {
    Available,
    WrongModelReturned,
    HttpError,
    Timeout,
    TransportError,
}

/// Final judgement for one requested model. Exactly one per probe.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub model: String,
    pub available: bool,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub elapsed_secs: f64,
}

/// Decision table, evaluated top-down, first matching branch wins:
///
/// 1. no HTTP response + timeout wording      -> Timeout
/// 2. no HTTP response, anything else         -> TransportError
/// 3. non-2xx                                 -> HttpError
/// 4. 2xx + models match under the policy     -> Available
/// 5. 2xx otherwise                           -> WrongModelReturned
pub fn classify(outcome: ProbeOutcome, table: &ModelTable, policy: MatchPolicy) -> Verdict {
    let ProbeOutcome {
        requested_model,
        http_status,
        vendor_model,
        elapsed_secs,
        raw_error,
    } = outcome;

    let (status, detail) = match http_status {
        None => {
            let message = raw_error
                .unwrap_or_else(|| "request failed before receiving a response".to_owned());
            if looks_like_timeout(&message) {
                (ProbeStatus::Timeout, None)
            } else {
                (ProbeStatus::TransportError, Some(message))
            }
        }
        Some(code) if !(200..300).contains(&code) => {
            let message = raw_error.unwrap_or_else(|| format!("HTTP error {code}"));
            (ProbeStatus::HttpError, Some(message))
        }
        Some(_) => {
            let vendor = vendor_model.as_deref().unwrap_or("");
            if model_matches(policy, table, &requested_model, vendor) {
                (ProbeStatus::Available, None)
            } else {
                (ProbeStatus::WrongModelReturned, Some(vendor.to_owned()))
            }
        }
    };

    Verdict {
        available: status == ProbeStatus::Available,
        model: requested_model,
        status,
        detail,
        vendor_model,
        http_status,
        elapsed_secs,
    }
}

fn model_matches(policy: MatchPolicy, table: &ModelTable, requested: &str, vendor: &str) -> bool {
    match policy {
        MatchPolicy::Normalized => {
            let requested_norm = table.normalize(requested);
            let vendor_norm = table.normalize(vendor);
            let matched = match (requested_norm, vendor_norm) {
                (Some(req), Some(ven)) => req == ven,
                // Either side unrecognized: compare the raw strings.
                _ => requested == vendor,
            };
            matched
                || (requested_norm == Some(model::GENERIC_MODEL_ID)
                    && vendor.contains(model::GENERIC_FAMILY_TOKEN))
        }
        MatchPolicy::SlashSuffix => {
            vendor == requested
                || requested
                    .split_once('/')
                    .is_some_and(|(_, suffix)| vendor.contains(suffix))
        }
    }
}

fn looks_like_timeout(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("timed out") || message.contains("timeout")
}
