use thiserror::Error;

/// Errors surfaced by the resource factory and execution surface.
///
/// Allocation and device failures come back as `Err`; they are expected,
/// checkable conditions. Caller contract violations (null required handle,
/// mismatched resource counts) assert in debug builds and surface as
/// [`GpuError::Validation`] in release builds.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("ran out of resource slots")]
    SlotExhausted,
    #[error("invalid or stale resource handle")]
    InvalidHandle,
    #[error("validation failure: {0}")]
    Validation(&'static str),
    #[error("not supported by this backend: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, GpuError>;
