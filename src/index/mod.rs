//! Vector index of example questions
//!
//! Maps question records to embedded documents and back. Search is a
//! brute-force cosine ranking over the whole collection, which is fine at
//! the size of a listening-test question bank.

pub mod embed;

pub use embed::{cosine, Embedder, GeminiEmbedder, HashingEmbedder};

use crate::questions::transcript::{parse_records, QuestionRecord};
use crate::{PracticeError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the collection stored in the index directory
pub const COLLECTION_NAME: &str = "spanish_questions";

const COLLECTION_FILE: &str = "collection.json";

/// One stored record with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    pub document: String,
    pub metadata: QuestionRecord,
    pub embedding: Vec<f32>,
}

/// A search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub record: QuestionRecord,
    pub score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Collection {
    name: String,
    embedder: String,
    documents: Vec<IndexedDocument>,
}

/// Text that gets embedded for a record
pub fn document_text(record: &QuestionRecord) -> String {
    format!(
        "Conversation: {} Question: {} Answer: {}",
        record.conversation, record.question, record.answer
    )
}

/// Persistent question index
pub struct QuestionIndex<E> {
    dir: PathBuf,
    embedder: E,
    collection: Collection,
}

impl<E: Embedder> QuestionIndex<E> {
    /// Open (or create) the index stored in `dir`
    pub fn open(dir: impl AsRef<Path>, embedder: E) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let path = dir.join(COLLECTION_FILE);
        let collection = if path.exists() {
            let collection: Collection = serde_json::from_str(&fs::read_to_string(&path)?)?;
            if collection.embedder != embedder.name() {
                return Err(PracticeError::Index(format!(
                    "Index at {:?} was built with embedder '{}', not '{}'",
                    dir,
                    collection.embedder,
                    embedder.name()
                )));
            }
            debug!(
                "Loaded {} documents from {:?}",
                collection.documents.len(),
                path
            );
            collection
        } else {
            Collection {
                name: COLLECTION_NAME.to_string(),
                embedder: embedder.name(),
                documents: Vec::new(),
            }
        };

        Ok(Self {
            dir,
            embedder,
            collection,
        })
    }

    pub fn len(&self) -> usize {
        self.collection.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.documents.is_empty()
    }

    /// Add every record from a JSON questions file
    pub fn add_questions(&mut self, path: &Path) -> Result<usize> {
        let records = parse_records(&fs::read_to_string(path)?)?;
        self.add_records(&records)
    }

    /// Embed and store records, skipping ones already indexed
    ///
    /// Returns how many were added.
    pub fn add_records(&mut self, records: &[QuestionRecord]) -> Result<usize> {
        let mut added = 0;
        for record in records {
            let document = document_text(record);
            if self
                .collection
                .documents
                .iter()
                .any(|d| d.document == document)
            {
                debug!("Already indexed: {}", record.question);
                continue;
            }

            let embedding = self.embedder.embed(&document)?;
            let id = format!("q_{}", self.collection.documents.len());
            self.collection.documents.push(IndexedDocument {
                id,
                document,
                metadata: record.clone(),
                embedding,
            });
            added += 1;
        }

        if added > 0 {
            self.persist()?;
        }
        info!("Indexed {} new questions ({} total)", added, self.len());
        Ok(added)
    }

    /// Up to `n` records most similar to `query`, best first
    pub fn similar(&self, query: &str, n: usize) -> Result<Vec<SearchHit>> {
        let query = self.embedder.embed(query)?;
        let mut hits: Vec<SearchHit> = self
            .collection
            .documents
            .iter()
            .map(|d| SearchHit {
                record: d.metadata.clone(),
                score: cosine(&query, &d.embedding),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(n);
        Ok(hits)
    }

    /// Every stored record, in insertion order
    pub fn all_questions(&self) -> Vec<QuestionRecord> {
        self.collection
            .documents
            .iter()
            .map(|d| d.metadata.clone())
            .collect()
    }

    /// Unique conversations, sorted
    pub fn all_conversations(&self) -> Vec<String> {
        self.collection
            .documents
            .iter()
            .map(|d| d.metadata.conversation.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.collection)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(self.dir.join(COLLECTION_FILE))
            .map_err(|e| e.error)?;
        Ok(())
    }
}
