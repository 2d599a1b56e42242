//! Top-level question-answering entry points.
//!
//! ## Why three entry points?
//!
//! [`answer`] is the everything-included path: fetch, extract, retrieve,
//! ask. [`answer_request`] wraps it for callers holding a deserialised
//! [`QaRequest`] (a service endpoint, typically) and validates the request
//! first. [`answer_text`] skips fetch and extraction entirely for callers
//! that already hold plain text — tests, re-runs over cached extractions,
//! or non-PDF sources.

use crate::config::{AnswerMode, QaConfig};
use crate::error::QaError;
use crate::llm::{
    embedding_cache_key, CompletionClient, Embedder, EmbeddingCache, MemoryEmbeddingCache,
    OpenAiClient,
};
use crate::output::{AnswerResult, DocumentMetadata, QaOutput, QaStats};
use crate::pipeline::chunk::{chunk_text, Chunk};
use crate::pipeline::score::{rank_chunks, RankingEmbeddings};
use crate::pipeline::select::{build_context, top_k};
use crate::pipeline::{ask, assemble, extract, fetch};
use crate::prompts::SweepEntry;
use crate::request::QaRequest;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process-wide embedding cache used when the config does not inject one.
static DEFAULT_EMBEDDING_CACHE: Lazy<Arc<MemoryEmbeddingCache>> =
    Lazy::new(|| Arc::new(MemoryEmbeddingCache::new()));

/// Answer questions about a PDF document.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local file path or HTTP/HTTPS URL to a PDF
/// * `questions` — Questions to answer, in the order answers are wanted
/// * `config` — Pipeline configuration
///
/// # Returns
/// `Ok(QaOutput)` on success, even if some questions failed (check
/// `output.stats.unanswered`). `output.answers` always has exactly one
/// entry per question.
///
/// # Errors
/// Returns `Err(QaError)` only for fatal errors:
/// - Request exceeds the configured question bound
/// - File not found / download failed / not a PDF
/// - No extractable text in the document
/// - No completion backend configured
pub async fn answer(
    input: impl AsRef<str>,
    questions: &[String],
    config: &QaConfig,
) -> Result<QaOutput, QaError> {
    let input = input.as_ref();
    info!("Answering {} questions from: {}", questions.len(), input);

    check_question_bound(questions, config)?;

    let fetch_start = Instant::now();
    let bytes = fetch::fetch_document(input, config.download_timeout_secs).await?;
    let text = extract::extract_text(bytes).await?;
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;
    debug!(
        "Extracted {} bytes of text in {}ms",
        text.len(),
        fetch_duration_ms
    );

    let mut output = answer_text(input, text, questions, config).await?;
    output.stats.fetch_duration_ms = fetch_duration_ms;
    output.stats.total_duration_ms += fetch_duration_ms;
    Ok(output)
}

/// Answer a deserialised [`QaRequest`], validating it first.
pub async fn answer_request(request: &QaRequest, config: &QaConfig) -> Result<QaOutput, QaError> {
    request.validate(config)?;
    answer(&request.document, &request.questions, config).await
}

/// Answer questions against already-extracted plain text.
///
/// `source` only labels the output metadata and keys the embedding cache;
/// nothing is fetched.
pub async fn answer_text(
    source: impl Into<String>,
    text: String,
    questions: &[String],
    config: &QaConfig,
) -> Result<QaOutput, QaError> {
    let total_start = Instant::now();
    let source = source.into();

    check_question_bound(questions, config)?;
    if text.trim().is_empty() {
        return Err(QaError::EmptyDocument);
    }

    let chunks = chunk_text(&text, config.chunk_size, config.chunk_overlap);
    let metadata = DocumentMetadata {
        source: source.clone(),
        text_len: text.len(),
        chunk_count: chunks.len(),
    };
    debug!("Split text into {} chunks", chunks.len());

    if questions.is_empty() {
        return Ok(QaOutput {
            answers: Vec::new(),
            results: Vec::new(),
            metadata,
            stats: QaStats {
                total_duration_ms: total_start.elapsed().as_millis() as u64,
                ..Default::default()
            },
        });
    }

    let client = resolve_client(config)?;
    let embeddings = if config.use_embeddings {
        resolve_embeddings(&source, &chunks, questions, config).await
    } else {
        None
    };

    let llm_start = Instant::now();
    let (mut results, sweeps) = match config.mode {
        AnswerMode::PerQuestion => (
            answer_per_question(&client, &chunks, questions, embeddings.as_ref(), config).await,
            0,
        ),
        AnswerMode::Sweep => answer_by_sweeps(&client, &chunks, questions, config).await,
    };
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    results.sort_by_key(|r| r.index);
    let answers: Vec<String> = results.iter().map(|r| r.answer.clone()).collect();
    debug_assert_eq!(answers.len(), questions.len());

    let answered = answers.iter().filter(|a| !a.is_empty()).count();
    let stats = QaStats {
        total_questions: questions.len(),
        answered,
        unanswered: questions.len() - answered,
        sweeps,
        total_retries: results.iter().map(|r| r.retries).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        fetch_duration_ms: 0,
        llm_duration_ms,
    };

    info!(
        "Answered {}/{} questions in {}ms",
        answered, questions.len(), stats.total_duration_ms
    );

    Ok(QaOutput {
        answers,
        results,
        metadata,
        stats,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn check_question_bound(questions: &[String], config: &QaConfig) -> Result<(), QaError> {
    if let Some(max) = config.max_questions {
        if questions.len() > max {
            return Err(QaError::InvalidRequest(format!(
                "{} questions exceeds the limit of {}",
                questions.len(),
                max
            )));
        }
    }
    Ok(())
}

/// Resolve the completion client, from most-specific to least-specific.
///
/// 1. **Pre-built client** (`config.client`) — the caller constructed and
///    configured the client entirely; used as-is. Useful in tests or when
///    the caller needs custom middleware.
/// 2. **Config + environment** — `config.base_url`/`config.model` override
///    `PDFQA_BASE_URL`/`PDFQA_MODEL`, which override the OpenAI defaults.
fn resolve_client(config: &QaConfig) -> Result<Arc<dyn CompletionClient>, QaError> {
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }
    let client = OpenAiClient::from_env(
        config.base_url.as_deref(),
        config.model.as_deref(),
        config.api_timeout_secs,
    )?;
    Ok(Arc::new(client))
}

/// Embeddings for one run: chunk vectors (cache-backed) plus fresh question
/// vectors. `None` means embeddings are unavailable and scoring falls back
/// to lexical similarity for the whole run; embedding trouble is never fatal.
struct RunEmbeddings {
    chunks: Vec<Vec<f32>>,
    questions: Vec<Vec<f32>>,
}

async fn resolve_embeddings(
    source: &str,
    chunks: &[Chunk],
    questions: &[String],
    config: &QaConfig,
) -> Option<RunEmbeddings> {
    let (embedder, model_label): (Arc<dyn Embedder>, String) = match config.embedder {
        Some(ref e) => (Arc::clone(e), "custom".to_string()),
        None => {
            let client = match OpenAiClient::from_env(
                config.base_url.as_deref(),
                config.model.as_deref(),
                config.api_timeout_secs,
            ) {
                Ok(c) => c,
                Err(e) => {
                    warn!("No embedding backend available ({}); using lexical scoring", e);
                    return None;
                }
            };
            let label = client.embedding_model().to_string();
            (Arc::new(client), label)
        }
    };

    let cache: Arc<dyn EmbeddingCache> = config
        .embedding_cache
        .clone()
        .unwrap_or_else(|| DEFAULT_EMBEDDING_CACHE.clone() as Arc<dyn EmbeddingCache>);

    let key = embedding_cache_key(&model_label, source, config.chunk_size, config.chunk_overlap);

    let chunk_vectors = match cache.get(&key) {
        Some(cached) if cached.len() == chunks.len() => {
            debug!("Embedding cache hit for {} chunks", cached.len());
            cached
        }
        _ => {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            match embedder.embed_batch(&texts).await {
                Ok(vectors) => {
                    cache.put(key, vectors.clone());
                    vectors
                }
                Err(e) => {
                    warn!("Chunk embedding failed ({}); using lexical scoring", e);
                    return None;
                }
            }
        }
    };

    let question_vectors = match embedder.embed_batch(questions).await {
        Ok(vectors) => vectors,
        Err(e) => {
            warn!("Question embedding failed ({}); using lexical scoring", e);
            return None;
        }
    };

    Some(RunEmbeddings {
        chunks: chunk_vectors,
        questions: question_vectors,
    })
}

/// Per-question mode: each question gets its own top-k context and its own
/// completion call, fanned out up to `config.concurrency` at a time.
async fn answer_per_question(
    client: &Arc<dyn CompletionClient>,
    chunks: &[Chunk],
    questions: &[String],
    embeddings: Option<&RunEmbeddings>,
    config: &QaConfig,
) -> Vec<AnswerResult> {
    stream::iter(questions.iter().enumerate().map(|(index, question)| {
        let client = Arc::clone(client);
        async move {
            if question.trim().is_empty() {
                debug!("Question {}: blank, skipping backend call", index);
                return AnswerResult::empty(index);
            }

            let ranking = embeddings.and_then(|run| {
                run.questions.get(index).map(|q| RankingEmbeddings {
                    question: q,
                    chunks: &run.chunks,
                })
            });
            let scored = rank_chunks(question, chunks, ranking, config.lexical_prefix_chars);
            let selected = top_k(scored, config.top_k);
            let context = build_context(
                &selected,
                chunks,
                &config.context_separator,
                config.max_context_chars,
            );

            ask::ask_question(&client, index, question, &context, config).await
        }
    }))
    .buffer_unordered(config.concurrency)
    .collect()
    .await
}

/// Sweep mode: walk the document in groups of `config.sweep_chunks`, asking
/// one batched call per group for every still-unanswered question. Sweeps
/// run sequentially; the loop stops early once every question has a real
/// answer. The sentinel and empty answers are never recorded, so a question
/// the backend cannot answer from one group stays live for the next.
async fn answer_by_sweeps(
    client: &Arc<dyn CompletionClient>,
    chunks: &[Chunk],
    questions: &[String],
    config: &QaConfig,
) -> (Vec<AnswerResult>, u32) {
    let n = questions.len();
    let mut sheet = assemble::AnswerSheet::new(n);
    let mut results: Vec<AnswerResult> = (0..n).map(AnswerResult::empty).collect();
    let mut sweeps = 0u32;

    // Blank questions are never asked; treat them as settled from the start.
    let is_live =
        |sheet: &assemble::AnswerSheet, i: usize| !questions[i].trim().is_empty() && !sheet.is_answered(i);

    for group in chunks.chunks(config.sweep_chunks) {
        let pending: Vec<usize> = (0..n).filter(|&i| is_live(&sheet, i)).collect();
        if pending.is_empty() {
            break;
        }

        let context = join_group(group, config);
        let entries: Vec<SweepEntry> = pending
            .iter()
            .map(|&i| SweepEntry {
                index: i,
                question: questions[i].clone(),
                context: context.clone(),
            })
            .collect();

        let outcome = ask::ask_sweep(client, &entries, config).await;
        sweeps += 1;

        if let Some(ref err) = outcome.error {
            warn!("Sweep {} failed, moving on: {}", sweeps, err);
        }

        for fragment in &outcome.fragments {
            if fragment.ques >= n {
                warn!("Sweep reply referenced unknown question {}", fragment.ques);
                continue;
            }
            if sheet.record(fragment.ques, &fragment.ans) {
                let slot = &mut results[fragment.ques];
                slot.answer = fragment.ans.clone();
                slot.retries += outcome.retries;
                slot.duration_ms = outcome.duration_ms;
            }
        }
    }

    // The sheet is authoritative: it rejected sentinels, duplicates, and
    // out-of-range indices, so copy its view back over the result slots.
    for (result, answer) in results.iter_mut().zip(sheet.into_answers()) {
        result.answer = answer;
    }

    (results, sweeps)
}

/// Join one sweep group's chunks into a bounded context string.
fn join_group(group: &[Chunk], config: &QaConfig) -> String {
    let joined = group
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(&config.context_separator);
    if joined.len() <= config.max_context_chars {
        return joined;
    }
    let cut = crate::pipeline::chunk::floor_char_boundary(&joined, config.max_context_chars);
    joined[..cut].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_bound_is_enforced() {
        let config = QaConfig::builder().max_questions(Some(2)).build().unwrap();
        let questions = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let err = check_question_bound(&questions, &config).unwrap_err();
        assert!(matches!(err, QaError::InvalidRequest(_)));
    }

    #[test]
    fn question_bound_none_disables_check() {
        let config = QaConfig::builder().max_questions(None).build().unwrap();
        let questions: Vec<String> = (0..10_000).map(|i| format!("q{i}")).collect();
        assert!(check_question_bound(&questions, &config).is_ok());
    }

    #[test]
    fn join_group_respects_context_bound() {
        let config = QaConfig::builder().max_context_chars(10).build().unwrap();
        let group = vec![
            Chunk {
                text: "aaaaaaaa".into(),
                offset: 0,
                index: 0,
            },
            Chunk {
                text: "bbbbbbbb".into(),
                offset: 8,
                index: 1,
            },
        ];
        let joined = join_group(&group, &config);
        assert!(joined.len() <= 10);
        assert!(joined.starts_with("aaaa"));
    }
}
