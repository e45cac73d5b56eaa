//! End-to-end tests for the retrieval service over a real on-disk store.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use docmind_embeddings::{Embedder, Embedding};
use docmind_retrieval::{DocumentChunks, RetrievalConfig, RetrievalError, RetrievalService};

const DIM: usize = 4;

/// Deterministic embedder: three topic axes plus a text checksum component,
/// so distinct texts get distinct, well-separated vectors without a model.
struct StubEmbedder;

fn embed_text(text: &str) -> Embedding {
    let lower = text.to_lowercase();
    let axis = |words: &[&str]| {
        if words.iter().any(|w| lower.contains(w)) {
            1.0
        } else {
            0.0
        }
    };

    let checksum: u32 = lower.bytes().map(u32::from).sum();
    vec![
        axis(&["sky", "blue"]),
        axis(&["grass", "green"]),
        axis(&["water", "wet"]),
        (checksum % 97) as f32 / 97.0,
    ]
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn name(&self) -> &str {
        "stub"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed_batch(&self, texts: &[String]) -> docmind_embeddings::Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }
}

fn service(dir: &TempDir) -> RetrievalService {
    let config = RetrievalConfig::new(dir.path()).with_dimension(DIM);
    RetrievalService::new(config, Arc::new(StubEmbedder)).unwrap()
}

fn sky_chunks() -> Vec<String> {
    vec![
        "The sky is blue.".to_string(),
        "Grass is green.".to_string(),
        "Water is wet.".to_string(),
    ]
}

#[tokio::test]
async fn test_index_then_search_bounds_and_ownership() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    service
        .index_document("s1", "doc.txt", &sky_chunks())
        .await
        .unwrap();

    assert!(service.is_indexed("s1", "doc.txt").await.unwrap());

    // k larger than the document: capped at chunk count.
    let results = service
        .search("s1", "doc.txt", "anything at all", 10)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);

    // k smaller than the document: exactly k.
    let results = service
        .search("s1", "doc.txt", "anything at all", 2)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_search_returns_closest_chunk_first() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    service
        .index_document("s1", "doc.txt", &sky_chunks())
        .await
        .unwrap();

    let results = service
        .search("s1", "doc.txt", "What color is the sky?", 1)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].position, 0);
    assert_eq!(results[0].text, "The sky is blue.");

    // Ranking is by ascending distance.
    let all = service
        .search("s1", "doc.txt", "What color is the sky?", 3)
        .await
        .unwrap();
    assert!(all[0].distance <= all[1].distance);
    assert!(all[1].distance <= all[2].distance);
}

#[tokio::test]
async fn test_remove_makes_document_unsearchable() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    service
        .index_document("s1", "doc.txt", &sky_chunks())
        .await
        .unwrap();
    service.deindex_document("s1", "doc.txt").await.unwrap();

    assert!(!service.is_indexed("s1", "doc.txt").await.unwrap());
    let results = service
        .search("s1", "doc.txt", "anything", 3)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_deindex_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    service
        .index_document("s1", "doc.txt", &sky_chunks())
        .await
        .unwrap();

    service.deindex_document("s1", "doc.txt").await.unwrap();
    service.deindex_document("s1", "doc.txt").await.unwrap();

    assert!(!service.is_indexed("s1", "doc.txt").await.unwrap());
}

#[tokio::test]
async fn test_round_trip_yields_no_duplicates() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    let chunks = sky_chunks();

    service
        .index_document("s1", "doc.txt", &chunks)
        .await
        .unwrap();
    service.deindex_document("s1", "doc.txt").await.unwrap();
    service
        .index_document("s1", "doc.txt", &chunks)
        .await
        .unwrap();

    // Exactly n chunks, not 2n.
    let results = service
        .search("s1", "doc.txt", "anything", 100)
        .await
        .unwrap();
    assert_eq!(results.len(), chunks.len());
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    service
        .index_document("s1", "doc.txt", &sky_chunks())
        .await
        .unwrap();

    // Same document id, different session: nothing leaks.
    assert!(!service.is_indexed("s2", "doc.txt").await.unwrap());
    let results = service
        .search("s2", "doc.txt", "What color is the sky?", 3)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_documents_are_isolated_within_a_session() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    service
        .index_document("s1", "doc-a.txt", &sky_chunks())
        .await
        .unwrap();
    service
        .index_document(
            "s1",
            "doc-b.txt",
            &["An unrelated paragraph.".to_string()],
        )
        .await
        .unwrap();

    let results = service
        .search("s1", "doc-b.txt", "What color is the sky?", 10)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "An unrelated paragraph.");
}

#[tokio::test]
async fn test_search_absent_document_is_empty() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let results = service
        .search("s1", "never-indexed.txt", "query", 3)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_index_rejects_empty_inputs() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let err = service
        .index_document("s1", "doc.txt", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::EmptyDocument { .. }));

    let err = service
        .index_document(
            "s1",
            "doc.txt",
            &["fine".to_string(), "   ".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::EmptyChunk { position: 1, .. }
    ));

    // Neither attempt left anything behind.
    assert!(!service.is_indexed("s1", "doc.txt").await.unwrap());
}

#[tokio::test]
async fn test_batch_reports_partial_success() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let docs = vec![
        DocumentChunks {
            document_id: "good-1.txt".to_string(),
            chunks: sky_chunks(),
        },
        DocumentChunks {
            document_id: "bad.txt".to_string(),
            chunks: vec![],
        },
        DocumentChunks {
            document_id: "good-2.txt".to_string(),
            chunks: vec!["A single chunk.".to_string()],
        },
    ];

    let report = service.index_batch("s1", docs).await;

    assert_eq!(report.succeeded, vec!["good-1.txt", "good-2.txt"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "bad.txt");
    assert!(matches!(
        report.failed[0].1,
        RetrievalError::EmptyDocument { .. }
    ));

    // The failure did not abort the rest of the batch.
    assert!(service.is_indexed("s1", "good-2.txt").await.unwrap());
    assert!(!service.is_indexed("s1", "bad.txt").await.unwrap());
}

#[tokio::test]
async fn test_batch_replaces_previous_copy() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    service
        .index_document("s1", "doc.txt", &sky_chunks())
        .await
        .unwrap();

    // Re-ingesting through the batch path replaces, never accumulates.
    let report = service
        .index_batch(
            "s1",
            vec![DocumentChunks {
                document_id: "doc.txt".to_string(),
                chunks: vec!["Replacement chunk.".to_string()],
            }],
        )
        .await;
    assert_eq!(report.succeeded, vec!["doc.txt"]);

    let results = service
        .search("s1", "doc.txt", "anything", 100)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "Replacement chunk.");
}

#[tokio::test]
async fn test_index_survives_service_restart() {
    let dir = TempDir::new().unwrap();

    {
        let service = service(&dir);
        service
            .index_document("s1", "doc.txt", &sky_chunks())
            .await
            .unwrap();
    }

    let service = service(&dir);
    assert!(service.is_indexed("s1", "doc.txt").await.unwrap());

    let results = service
        .search("s1", "doc.txt", "What color is the sky?", 1)
        .await
        .unwrap();
    assert_eq!(results[0].position, 0);
}

#[tokio::test]
async fn test_dimension_mismatch_rejected_at_construction() {
    let dir = TempDir::new().unwrap();
    let config = RetrievalConfig::new(dir.path()).with_dimension(DIM + 1);

    let err = RetrievalService::new(config, Arc::new(StubEmbedder)).unwrap_err();
    assert!(matches!(err, RetrievalError::Config(_)));
}
