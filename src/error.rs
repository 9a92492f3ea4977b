use std::io;

/// Errors surfaced by the Etchash core.
///
/// Every variant corresponds to one of the failure kinds called out in the
/// design: precondition violations are caller bugs, `Io`/`Allocation` wrap an
/// underlying system failure, `Cancelled` reports a progress-callback abort,
/// and `EpochOutOfRange` guards the 2048-entry epoch tables.
#[derive(Debug, thiserror::Error)]
pub enum EtchashError {
    #[error("precondition failed: {0}")]
    PreconditionFailure(&'static str),

    #[error("allocation failed: {0}")]
    AllocationFailure(&'static str),

    #[error("i/o failure during {context}: {source}")]
    IoFailure {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("DAG generation cancelled by progress callback")]
    Cancelled,

    #[error("epoch {epoch} is out of range (max {max})")]
    EpochOutOfRange { epoch: u64, max: u64 },
}

pub type Result<T> = std::result::Result<T, EtchashError>;
