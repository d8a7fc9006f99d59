//! Crate-level error type.
//!
//! Tiling itself has no fatal error class: absent ids, boundary moves, and
//! unplaceable windows are silent no-ops, and tile failures are reported
//! through [`TileResult`](crate::actor::orchestrator::TileResult). The
//! variants here cover the ambient edges only.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config at {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    #[error("failed to read persisted state at {}", path.display())]
    StateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write persisted state at {}", path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode persisted state: {0}")]
    StateDecode(#[from] serde_json::Error),
}
