//! Concurrent probe dispatch: one completion request per requested model.

use std::time::Instant;

use futures_util::{stream, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::session::ApiSession;

/// Fixed user message sent with every probe.
const PROBE_GREETING: &str = "hi";

/// Completion cap keeping per-probe cost and latency small.
const MAX_COMPLETION_TOKENS: u32 = 20;

/// Result of one network attempt for one requested model.
///
/// Created exactly once when the request settles, consumed exactly once by
/// the classifier. `http_status` is absent when no HTTP response arrived.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub requested_model: String,
    pub http_status: Option<u16>,
    pub vendor_model: Option<String>,
    pub elapsed_secs: f64,
    pub raw_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Probes every model in `models`, yielding one outcome per input element in
/// input order regardless of completion order.
///
/// `concurrency` bounds how many requests are in flight at once; `None`
/// launches the entire list simultaneously, which is fine at this tool's
/// scale (tens of models) but does not scale past it.
///
/// Never fails: per-model errors are captured into the outcome, so one bad
/// probe cannot disturb the others.
pub async fn probe_all(
    session: &ApiSession,
    models: &[String],
    concurrency: Option<usize>,
) -> Vec<ProbeOutcome> {
    let width = concurrency.unwrap_or(models.len()).max(1);
    stream::iter(models.iter().cloned())
        .map(|model| probe_model(session, model))
        .buffered(width)
        .collect()
        .await
}

async fn probe_model(session: &ApiSession, model: String) -> ProbeOutcome {
    let started = Instant::now();
    let sent = session
        .client()
        .post(session.completions_url().clone())
        .json(&completion_payload(&model))
        .send()
        .await;
    let elapsed_secs = started.elapsed().as_secs_f64();

    match sent {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                match response.json::<CompletionEnvelope>().await {
                    Ok(body) => ProbeOutcome {
                        requested_model: model,
                        http_status: Some(status.as_u16()),
                        vendor_model: body.model,
                        elapsed_secs,
                        raw_error: None,
                    },
                    Err(err) => ProbeOutcome {
                        requested_model: model,
                        http_status: Some(status.as_u16()),
                        vendor_model: None,
                        elapsed_secs,
                        raw_error: Some(format!("unreadable completion body: {err}")),
                    },
                }
            } else {
                let raw_error = extract_error_message(response).await;
                tracing::debug!(
                    "`{model}` answered HTTP {}: {}",
                    status.as_u16(),
                    raw_error.as_deref().unwrap_or("<no error envelope>")
                );
                ProbeOutcome {
                    requested_model: model,
                    http_status: Some(status.as_u16()),
                    vendor_model: None,
                    elapsed_secs,
                    raw_error,
                }
            }
        }
        Err(err) => {
            let raw_error = format!("{:#}", anyhow::Error::new(err));
            tracing::warn!("probe for `{model}` failed in transport: {raw_error}");
            ProbeOutcome {
                requested_model: model,
                http_status: None,
                vendor_model: None,
                elapsed_secs,
                raw_error: Some(raw_error),
            }
        }
    }
}

/// Best-effort extraction of `{ error: { message } }` from a non-2xx body.
/// An unreadable or unparseable body yields `None`, never a failure.
async fn extract_error_message(response: reqwest::Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let envelope: ErrorEnvelope = serde_json::from_str(&body).ok()?;
    Some(envelope.error.message)
}

fn completion_payload(model: &str) -> serde_json::Value {
    json!({
        "messages": [{ "role": "user", "content": PROBE_GREETING }],
        "model": model,
        "max_tokens": MAX_COMPLETION_TOKENS,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use httpmock::prelude::*;
    use serde_json::Value;

    use super::*;
    use crate::classify::{classify, MatchPolicy, ProbeStatus};
    use crate::model::ModelTable;
    use crate::session::{ApiSession, SessionConfig};

    fn session_for(server: &MockServer, timeout: Duration) -> ApiSession {
        let config = SessionConfig {
            endpoint: server.url("/v1"),
            api_key: "test-key".to_owned(),
            timeout,
            extra_headers: &[("x-title", "modelprobe")],
        };
        ApiSession::new(&config).expect("session should build")
    }

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn builds_completion_payload_structure() {
        let payload = completion_payload("gpt-4o");
        assert_eq!(payload["model"], Value::String("gpt-4o".into()));
        assert_eq!(
            payload["messages"][0]["content"],
            Value::String(PROBE_GREETING.into())
        );
        assert_eq!(payload["max_tokens"], Value::from(MAX_COMPLETION_TOKENS));
    }

    #[tokio::test]
    async fn captures_echoed_model_and_status() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .header("x-title", "modelprobe")
                    .json_body_partial(r#"{"model":"gpt-4o"}"#);
                then.status(200).json_body(serde_json::json!({
                    "model": "gpt-4o-2024-11-20",
                    "choices": [{ "message": { "role": "assistant", "content": "hi" } }],
                }));
            })
            .await;

        let session = session_for(&server, Duration::from_secs(5));
        let outcomes = probe_all(&session, &models(&["gpt-4o"]), None).await;

        mock.assert_async().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].requested_model, "gpt-4o");
        assert_eq!(outcomes[0].http_status, Some(200));
        assert_eq!(outcomes[0].vendor_model.as_deref(), Some("gpt-4o-2024-11-20"));
        assert_eq!(outcomes[0].raw_error, None);
    }

    #[tokio::test]
    async fn parses_the_error_envelope_best_effort() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .json_body_partial(r#"{"model":"o1-mini"}"#);
                then.status(429)
                    .json_body(serde_json::json!({ "error": { "message": "rate limited" } }));
            })
            .await;

        let session = session_for(&server, Duration::from_secs(5));
        let outcomes = probe_all(&session, &models(&["o1-mini"]), None).await;

        assert_eq!(outcomes[0].http_status, Some(429));
        assert_eq!(outcomes[0].raw_error.as_deref(), Some("rate limited"));
    }

    #[tokio::test]
    async fn malformed_error_body_falls_back_to_the_status_alone() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(500).body("<html>bad gateway</html>");
            })
            .await;

        let session = session_for(&server, Duration::from_secs(5));
        let outcomes = probe_all(&session, &models(&["gpt-4o"]), None).await;

        assert_eq!(outcomes[0].http_status, Some(500));
        assert_eq!(outcomes[0].raw_error, None);
    }

    #[tokio::test]
    async fn outcomes_keep_input_order_and_isolate_failures() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .json_body_partial(r#"{"model":"alpha"}"#);
                then.status(200).json_body(serde_json::json!({ "model": "alpha" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .json_body_partial(r#"{"model":"beta"}"#);
                then.status(503)
                    .json_body(serde_json::json!({ "error": { "message": "down" } }));
            })
            .await;

        let session = session_for(&server, Duration::from_secs(5));
        // `alpha` appears twice: duplicates are probed independently.
        let input = models(&["alpha", "beta", "alpha"]);
        let outcomes = probe_all(&session, &input, None).await;

        let requested: Vec<&str> = outcomes
            .iter()
            .map(|outcome| outcome.requested_model.as_str())
            .collect();
        assert_eq!(requested, vec!["alpha", "beta", "alpha"]);
        assert_eq!(outcomes[0].http_status, Some(200));
        assert_eq!(outcomes[1].http_status, Some(503));
        assert_eq!(outcomes[1].raw_error.as_deref(), Some("down"));
        assert_eq!(outcomes[2].http_status, Some(200));

        // The failure in the middle does not leak into neighboring verdicts.
        let table = ModelTable::builtin();
        let verdicts: Vec<_> = outcomes
            .into_iter()
            .map(|outcome| classify(outcome, table, MatchPolicy::Normalized))
            .collect();
        let models: Vec<&str> = verdicts.iter().map(|v| v.model.as_str()).collect();
        assert_eq!(models, vec!["alpha", "beta", "alpha"]);
        assert!(verdicts[0].available);
        assert_matches!(verdicts[1].status, ProbeStatus::HttpError);
        assert!(verdicts[2].available);
    }

    #[tokio::test]
    async fn bounded_fanout_still_covers_the_whole_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(serde_json::json!({ "model": "alpha" }));
            })
            .await;

        let session = session_for(&server, Duration::from_secs(5));
        let input = models(&["alpha", "alpha", "alpha", "alpha", "alpha"]);
        let outcomes = probe_all(&session, &input, Some(2)).await;

        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|outcome| outcome.http_status == Some(200)));
    }

    #[tokio::test]
    async fn timeouts_are_captured_not_raised() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .json_body(serde_json::json!({ "model": "gpt-4o" }))
                    .delay(Duration::from_secs(2));
            })
            .await;

        let session = session_for(&server, Duration::from_millis(200));
        let mut outcomes = probe_all(&session, &models(&["gpt-4o"]), None).await;

        assert_eq!(outcomes[0].http_status, None);
        let error = outcomes[0].raw_error.as_deref().expect("error text");
        assert!(
            error.to_ascii_lowercase().contains("timed out"),
            "unexpected error text: {error}"
        );

        let verdict = classify(outcomes.remove(0), ModelTable::builtin(), MatchPolicy::Normalized);
        assert_matches!(verdict.status, ProbeStatus::Timeout);
    }

    #[tokio::test]
    async fn connection_failures_are_captured_not_raised() {
        let config = SessionConfig {
            // Nothing listens on the discard port.
            endpoint: "http://127.0.0.1:9/v1".to_owned(),
            api_key: "test-key".to_owned(),
            timeout: Duration::from_secs(2),
            extra_headers: &[],
        };
        let session = ApiSession::new(&config).expect("session should build");
        let outcomes = probe_all(&session, &models(&["gpt-4o"]), None).await;

        assert_eq!(outcomes[0].http_status, None);
        assert!(outcomes[0].raw_error.is_some());
    }
}
