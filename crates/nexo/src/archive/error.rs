//! Archive error types.

use thiserror::Error;

use crate::render::RenderError;
use crate::rpc::RpcError;

/// Errors that end a whole run.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to list pending {queue}: {source}")]
    Discovery {
        queue: &'static str,
        #[source]
        source: RpcError,
    },
    #[error("An archive run is already in progress")]
    AlreadyRunning,
}

/// Why a single document could not be archived. Never aborts the run.
#[derive(Debug, Error)]
pub enum ItemFailure {
    #[error("no data found")]
    NotFound,
    #[error("failed to fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: RpcError,
    },
    #[error("{0}")]
    Render(#[from] RenderError),
    #[error("upload failed: {0}")]
    Upload(#[source] RpcError),
    #[error("render task failed: {0}")]
    Task(String),
}

impl ItemFailure {
    pub(crate) fn fetch(what: &'static str) -> impl FnOnce(RpcError) -> Self {
        move |source| Self::Fetch { what, source }
    }
}
