//! Completion calls: one question (or one sweep) in, parsed answers out.
//!
//! This module is intentionally thin — prompt wording lives in
//! [`crate::prompts`] and reply decoding in [`super::parse`], so retry and
//! error-handling logic here can change without touching either.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from completion APIs are transient and frequent
//! under concurrent load. Attempts are spaced by a fixed `retry_delay_ms`
//! pause; a reply that arrives but fails to parse counts as a failed attempt
//! too, since a garbled reply is as transient as a dropped connection.

use crate::config::QaConfig;
use crate::error::QuestionError;
use crate::llm::{ChatMessage, CompletionClient};
use crate::output::AnswerResult;
use crate::pipeline::parse::{parse_batch, parse_single, AnswerFragment};
use crate::prompts::{
    question_payload, sweep_payload, SweepEntry, PER_QUESTION_SYSTEM_PROMPT, SWEEP_SYSTEM_PROMPT,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Ask the backend a single question against its selected context.
///
/// Always returns an `AnswerResult` — never propagates the error upward, so
/// one bad question doesn't abort the request. On success the backend's
/// answer is passed through verbatim, sentinel included; callers that want
/// to treat the sentinel specially do so downstream.
pub async fn ask_question(
    client: &Arc<dyn CompletionClient>,
    index: usize,
    question: &str,
    context: &str,
    config: &QaConfig,
) -> AnswerResult {
    let start = Instant::now();
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(PER_QUESTION_SYSTEM_PROMPT);

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(question_payload(context, question)),
    ];

    let mut last_err: Option<QuestionError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            warn!(
                "Question {}: retry {}/{} after {}ms",
                index, attempt, config.max_retries, config.retry_delay_ms
            );
            sleep(Duration::from_millis(config.retry_delay_ms)).await;
        }

        match client
            .complete(messages.clone(), config.temperature, config.max_tokens)
            .await
        {
            Ok(raw) => match parse_single(&raw) {
                Ok(answer) => {
                    let duration = start.elapsed();
                    debug!(
                        "Question {}: answered in {:?} ({} attempt{})",
                        index,
                        duration,
                        attempt + 1,
                        if attempt == 0 { "" } else { "s" }
                    );
                    return AnswerResult {
                        index,
                        answer,
                        retries: attempt,
                        duration_ms: duration.as_millis() as u64,
                        error: None,
                    };
                }
                Err(e) => {
                    warn!("Question {}: attempt {} unparseable — {}", index, attempt + 1, e);
                    last_err = Some(QuestionError::ParseFailed {
                        index,
                        detail: e.to_string(),
                    });
                }
            },
            Err(e) => {
                warn!("Question {}: attempt {} failed — {}", index, attempt + 1, e);
                last_err = Some(QuestionError::LlmFailed {
                    index,
                    retries: config.max_retries,
                    detail: e.to_string(),
                });
            }
        }
    }

    // All retries exhausted; the slot degrades to an empty answer.
    AnswerResult {
        index,
        answer: String::new(),
        retries: config.max_retries,
        duration_ms: start.elapsed().as_millis() as u64,
        error: last_err,
    }
}

/// Outcome of one batched sweep call.
#[derive(Debug)]
pub struct SweepOutcome {
    /// Parsed answer fragments; empty when the sweep failed.
    pub fragments: Vec<AnswerFragment>,
    /// Retries consumed.
    pub retries: u32,
    /// Wall-clock time for the call including retries, in milliseconds.
    pub duration_ms: u64,
    /// Present when the sweep was abandoned after exhausting retries.
    pub error: Option<String>,
}

/// Ask the backend one batched sweep of still-unanswered questions.
///
/// Like [`ask_question`], this never propagates — a failed sweep returns an
/// empty fragment list and the loop moves on to the next chunk group.
pub async fn ask_sweep(
    client: &Arc<dyn CompletionClient>,
    entries: &[SweepEntry],
    config: &QaConfig,
) -> SweepOutcome {
    let start = Instant::now();
    let messages = vec![
        ChatMessage::system(SWEEP_SYSTEM_PROMPT),
        ChatMessage::user(sweep_payload(entries)),
    ];

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            warn!(
                "Sweep ({} questions): retry {}/{} after {}ms",
                entries.len(),
                attempt,
                config.max_retries,
                config.retry_delay_ms
            );
            sleep(Duration::from_millis(config.retry_delay_ms)).await;
        }

        match client
            .complete(messages.clone(), config.temperature, config.max_tokens)
            .await
        {
            Ok(raw) => match parse_batch(&raw) {
                Ok(fragments) => {
                    let duration = start.elapsed();
                    debug!(
                        "Sweep: {} fragments for {} questions in {:?}",
                        fragments.len(),
                        entries.len(),
                        duration
                    );
                    return SweepOutcome {
                        fragments,
                        retries: attempt,
                        duration_ms: duration.as_millis() as u64,
                        error: None,
                    };
                }
                Err(e) => {
                    warn!("Sweep: attempt {} unparseable — {}", attempt + 1, e);
                    last_err = Some(e.to_string());
                }
            },
            Err(e) => {
                warn!("Sweep: attempt {} failed — {}", attempt + 1, e);
                last_err = Some(e.to_string());
            }
        }
    }

    SweepOutcome {
        fragments: Vec::new(),
        retries: config.max_retries,
        duration_ms: start.elapsed().as_millis() as u64,
        error: Some(last_err.unwrap_or_else(|| "unknown error".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QaError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies with a fixed script, one entry per call, repeating the last.
    struct ScriptedClient {
        replies: Vec<Result<String, String>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, QaError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.get(n).or_else(|| self.replies.last());
            match reply {
                Some(Ok(s)) => Ok(s.clone()),
                Some(Err(e)) => Err(QaError::BadReply(e.clone())),
                None => Err(QaError::Internal("no scripted reply".into())),
            }
        }
    }

    fn fast_config() -> QaConfig {
        QaConfig::builder()
            .max_retries(2)
            .retry_delay_ms(0)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn first_attempt_success() {
        let client: Arc<dyn CompletionClient> =
            Arc::new(ScriptedClient::new(vec![Ok(r#"{"ans":"1990"}"#.into())]));
        let result = ask_question(&client, 0, "when?", "founded 1990", &fast_config()).await;
        assert_eq!(result.answer, "1990");
        assert_eq!(result.retries, 0);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn transient_failure_then_success() {
        let client: Arc<dyn CompletionClient> = Arc::new(ScriptedClient::new(vec![
            Err("503".into()),
            Ok(r#"{"ans":"blue"}"#.into()),
        ]));
        let result = ask_question(&client, 4, "colour?", "the sky is blue", &fast_config()).await;
        assert_eq!(result.answer, "blue");
        assert_eq!(result.retries, 1);
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_to_empty() {
        let client: Arc<dyn CompletionClient> =
            Arc::new(ScriptedClient::new(vec![Err("down".into())]));
        let result = ask_question(&client, 2, "q?", "ctx", &fast_config()).await;
        assert_eq!(result.answer, "");
        assert_eq!(result.retries, 2);
        assert!(matches!(
            result.error,
            Some(QuestionError::LlmFailed { index: 2, .. })
        ));
    }

    #[tokio::test]
    async fn unparseable_reply_is_retried() {
        let client: Arc<dyn CompletionClient> = Arc::new(ScriptedClient::new(vec![
            Ok("no json at all".into()),
            Ok(r#"{"ans":"ok"}"#.into()),
        ]));
        let result = ask_question(&client, 0, "q?", "ctx", &fast_config()).await;
        assert_eq!(result.answer, "ok");
        assert_eq!(result.retries, 1);
    }

    #[tokio::test]
    async fn persistent_garbage_reports_parse_error() {
        let client: Arc<dyn CompletionClient> =
            Arc::new(ScriptedClient::new(vec![Ok("garbage".into())]));
        let result = ask_question(&client, 1, "q?", "ctx", &fast_config()).await;
        assert_eq!(result.answer, "");
        assert!(matches!(
            result.error,
            Some(QuestionError::ParseFailed { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn sentinel_passes_through_verbatim() {
        let client: Arc<dyn CompletionClient> = Arc::new(ScriptedClient::new(vec![Ok(
            r#"{"ans":"Not available in document."}"#.into(),
        )]));
        let result = ask_question(&client, 0, "q?", "ctx", &fast_config()).await;
        assert_eq!(result.answer, crate::prompts::NOT_AVAILABLE);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn sweep_returns_fragments() {
        let client: Arc<dyn CompletionClient> = Arc::new(ScriptedClient::new(vec![Ok(
            r#"{"answers":[{"ques":0,"ans":"a"},{"ques":3,"ans":"b"}]}"#.into(),
        )]));
        let entries = vec![
            SweepEntry {
                index: 0,
                question: "q0".into(),
                context: "ctx".into(),
            },
            SweepEntry {
                index: 3,
                question: "q3".into(),
                context: "ctx".into(),
            },
        ];
        let outcome = ask_sweep(&client, &entries, &fast_config()).await;
        assert_eq!(outcome.fragments.len(), 2);
        assert_eq!(outcome.fragments[1].ques, 3);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn failed_sweep_yields_no_fragments() {
        let client: Arc<dyn CompletionClient> =
            Arc::new(ScriptedClient::new(vec![Err("503".into())]));
        let entries = vec![SweepEntry {
            index: 0,
            question: "q".into(),
            context: "ctx".into(),
        }];
        let outcome = ask_sweep(&client, &entries, &fast_config()).await;
        assert!(outcome.fragments.is_empty());
        assert!(outcome.error.is_some());
    }
}
