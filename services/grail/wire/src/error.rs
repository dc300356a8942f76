//! Wire protocol error types.

use thiserror::Error;

/// Wire protocol errors
#[derive(Error, Debug)]
pub enum WireError {
    /// Frame size limit exceeded
    #[error("frame size limit exceeded: {0}")]
    Size(usize),
}
