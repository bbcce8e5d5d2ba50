//! Error types for network parameter loading.

/// Errors while reading or writing transformer parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// The underlying stream failed.
    #[error("failed to read network parameters")]
    Io(#[from] std::io::Error),

    /// The stream's layout hash does not match this transformer's feature
    /// set and output width.
    #[error("parameter layout hash mismatch: expected {expected:#010x}, found {found:#010x}")]
    HashMismatch { expected: u32, found: u32 },
}
