//! Error types for the editor

use folio_document::DocumentError;
use thiserror::Error;

use crate::mutations::MutationError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("No floating item is selected")]
    NoSelection,
}
