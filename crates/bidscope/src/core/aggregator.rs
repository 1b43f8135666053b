//! Concurrent decoding of a batch of uploads.
//!
//! Every file is decoded on its own blocking task, bounded by a semaphore.
//! Outcomes are collected independently: a failed or panicking decode is
//! recorded as a [`DecodeFailure`] for that file only, and successes are put
//! back into submission order before they are joined.

use crate::core::config::BidscopeConfig;
use crate::core::decoder::decode;
use crate::error::DecodeFailure;
use crate::types::{AggregatedInput, DecodedDocument, UploadedDocument};
use crate::{BidscopeError, Result};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Global Tokio runtime backing [`aggregate_sync`].
///
/// Runtime creation only fails when the process is out of threads or memory,
/// in which case nothing else would work either.
static GLOBAL_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create global Tokio runtime - system may be out of resources")
});

/// Per-file outcomes of one aggregation batch.
///
/// Both lists are in original submission order.
#[derive(Debug, Default)]
pub struct AggregationOutcome {
    pub successes: Vec<DecodedDocument>,
    pub failures: Vec<DecodeFailure>,
}

impl AggregationOutcome {
    /// The joined document text, or `None` when no file decoded successfully.
    pub fn combined_text(&self) -> Option<String> {
        if self.successes.is_empty() {
            None
        } else {
            Some(combine_documents(&self.successes))
        }
    }

    /// Turn the batch into request input.
    ///
    /// # Errors
    ///
    /// Returns `NoDecodedDocuments` carrying every failure when nothing decoded.
    pub fn into_input(self) -> Result<(AggregatedInput, Vec<DecodeFailure>)> {
        match self.combined_text() {
            Some(text) => Ok((AggregatedInput::Documents(text), self.failures)),
            None => Err(BidscopeError::NoDecodedDocuments {
                failures: self.failures,
            }),
        }
    }

    pub fn is_complete_failure(&self) -> bool {
        self.successes.is_empty()
    }
}

/// Wrap one decoded document in its boundary markers.
pub fn wrap_document(document: &DecodedDocument) -> String {
    format!(
        "--- START OF DOCUMENT: {name} ---\n\n{text}\n\n--- END OF DOCUMENT: {name} ---",
        name = document.name,
        text = document.text
    )
}

/// Join decoded documents in the given order, separated by a blank line.
///
/// # Example
///
/// ```rust
/// use bidscope::{DecodedDocument, combine_documents};
///
/// let docs = vec![
///     DecodedDocument { name: "a.txt".into(), text: "Hello".into() },
///     DecodedDocument { name: "b.txt".into(), text: "World".into() },
/// ];
/// assert_eq!(
///     combine_documents(&docs),
///     "--- START OF DOCUMENT: a.txt ---\n\nHello\n\n--- END OF DOCUMENT: a.txt ---\n\n\
///      --- START OF DOCUMENT: b.txt ---\n\nWorld\n\n--- END OF DOCUMENT: b.txt ---"
/// );
/// ```
pub fn combine_documents(documents: &[DecodedDocument]) -> String {
    documents.iter().map(wrap_document).collect::<Vec<_>>().join("\n\n")
}

/// Decode all files concurrently and partition the outcomes.
///
/// Completion order is arbitrary; both result lists follow submission order.
/// No single failure aborts the batch.
pub async fn aggregate(files: Vec<UploadedDocument>, config: &BidscopeConfig) -> AggregationOutcome {
    if files.is_empty() {
        return AggregationOutcome::default();
    }

    let total = files.len();
    let semaphore = Arc::new(Semaphore::new(config.decode_concurrency()));
    let names: Vec<String> = files.iter().map(|file| file.name.clone()).collect();

    let mut tasks = JoinSet::new();

    for (index, file) in files.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    let name = file.name.clone();
                    tokio::task::spawn_blocking(move || decode(&file))
                        .await
                        .unwrap_or_else(|e| Err(BidscopeError::Other(format!("Decoding {} panicked: {}", name, e))))
                }
                Err(e) => Err(BidscopeError::Other(format!("Decode queue closed: {}", e))),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<DecodedDocument>>> = (0..total).map(|_| None).collect();

    while let Some(task_result) = tasks.join_next().await {
        match task_result {
            Ok((index, result)) => slots[index] = Some(result),
            Err(join_err) => tracing::error!(error = %join_err, "Decode task failed to complete"),
        }
    }

    let mut outcome = AggregationOutcome::default();
    for (index, slot) in slots.into_iter().enumerate() {
        let result = slot.unwrap_or_else(|| {
            Err(BidscopeError::Other(format!(
                "Decoding {} produced no result",
                names[index]
            )))
        });
        match result {
            Ok(document) => outcome.successes.push(document),
            Err(error) => {
                tracing::warn!(file = %names[index], error = %error, "Document could not be decoded");
                outcome.failures.push(DecodeFailure::new(names[index].clone(), error));
            }
        }
    }

    tracing::info!(
        total,
        decoded = outcome.successes.len(),
        failed = outcome.failures.len(),
        "Aggregated document batch"
    );

    outcome
}

/// Synchronous wrapper for [`aggregate`].
///
/// Runs on a shared global runtime; do not call from within an async context.
pub fn aggregate_sync(files: Vec<UploadedDocument>, config: &BidscopeConfig) -> AggregationOutcome {
    GLOBAL_RUNTIME.block_on(aggregate(files, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn text_file(name: &str, text: &str) -> UploadedDocument {
        UploadedDocument::new(name, text.as_bytes(), "text/plain")
    }

    #[test]
    fn test_wrap_document_boundary_format() {
        let doc = DecodedDocument {
            name: "rfp.pdf".to_string(),
            text: "Body".to_string(),
        };
        assert_eq!(
            wrap_document(&doc),
            "--- START OF DOCUMENT: rfp.pdf ---\n\nBody\n\n--- END OF DOCUMENT: rfp.pdf ---"
        );
    }

    #[test]
    fn test_combine_single_document_has_no_separator() {
        let docs = vec![DecodedDocument {
            name: "only.md".to_string(),
            text: "x".to_string(),
        }];
        assert!(!combine_documents(&docs).ends_with("\n\n"));
    }

    #[tokio::test]
    async fn test_aggregate_empty_batch() {
        let outcome = aggregate(Vec::new(), &BidscopeConfig::default()).await;
        assert!(outcome.successes.is_empty());
        assert!(outcome.failures.is_empty());
        assert!(outcome.combined_text().is_none());
    }

    #[tokio::test]
    async fn test_aggregate_preserves_submission_order() {
        let files: Vec<_> = (0..12)
            .map(|i| text_file(&format!("part-{i:02}.txt"), &format!("section {i}")))
            .collect();
        let config = BidscopeConfig {
            max_concurrent_decodes: Some(3),
            ..Default::default()
        };

        let outcome = aggregate(files, &config).await;
        let names: Vec<_> = outcome.successes.iter().map(|d| d.name.as_str()).collect();
        let expected: Vec<_> = (0..12).map(|i| format!("part-{i:02}.txt")).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_aggregate_all_failures() {
        let files = vec![
            UploadedDocument::new("a.exe", vec![0x4D, 0x5A], "application/octet-stream"),
            UploadedDocument::new("b.pdf", b"garbage".to_vec(), "application/pdf"),
        ];

        let outcome = aggregate(files, &BidscopeConfig::default()).await;
        assert!(outcome.is_complete_failure());
        assert!(outcome.combined_text().is_none());
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].file_name, "a.exe");
        assert_eq!(outcome.failures[0].error.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(outcome.failures[1].error.kind(), ErrorKind::Decode);

        let err = outcome.into_input().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoDecodedDocuments);
    }

    #[test]
    fn test_aggregate_sync() {
        let outcome = aggregate_sync(
            vec![text_file("a.txt", "Hello"), text_file("b.txt", "World")],
            &BidscopeConfig::default(),
        );
        let (input, failures) = outcome.into_input().unwrap();
        assert!(failures.is_empty());
        assert!(matches!(input, AggregatedInput::Documents(_)));
        assert!(input.text().contains("--- END OF DOCUMENT: b.txt ---"));
    }
}
