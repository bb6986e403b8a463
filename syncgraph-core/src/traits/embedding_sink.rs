//! The optional Embedding Sink collaborator (§1): accepts a full per-file
//! parse, chunks it, generates vector embeddings, and persists them. The
//! core never inspects embeddings; it only pushes and logs failures.

use std::sync::Arc;

use crate::errors::SinkError;
use crate::types::ParsedFile;

pub trait EmbeddingSink: Send + Sync {
    fn upsert_file_embeddings(&self, parsed: &ParsedFile) -> Result<(), SinkError>;

    fn close(&self) -> Result<(), SinkError>;
}

impl<T> EmbeddingSink for Arc<T>
where
    T: EmbeddingSink + ?Sized,
{
    fn upsert_file_embeddings(&self, parsed: &ParsedFile) -> Result<(), SinkError> {
        (**self).upsert_file_embeddings(parsed)
    }

    fn close(&self) -> Result<(), SinkError> {
        (**self).close()
    }
}

/// Default embedding sink used when `enable_embeddings` is off, so the
/// engine's step 8 is always a plain, unconditional call.
#[derive(Debug, Default)]
pub struct NoOpEmbeddingSink;

impl EmbeddingSink for NoOpEmbeddingSink {
    fn upsert_file_embeddings(&self, _parsed: &ParsedFile) -> Result<(), SinkError> {
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
