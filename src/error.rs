//! Error taxonomy for the acquisition pipeline.
//!
//! Mid-stream failures deliberately behave differently per source: the
//! container path swallows `Decode` errors and ends the stream, while the
//! packet path propagates `Transport` errors to the run loop's caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    /// The container/engine could not be opened. Fatal to the open attempt,
    /// surfaced to the caller and not retried.
    #[error("failed to open source {locator}: {reason}")]
    SourceOpen { locator: String, reason: String },

    /// The UDP port could not be bound.
    #[error("failed to bind udp port {port}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Mid-stream decode failure. The container provider logs this and
    /// terminates its sequence instead of returning it.
    #[error("decode error: {0}")]
    Decode(String),

    /// Mid-stream packet-path failure. Propagated out of `run()`.
    #[error("transport error: {0}")]
    Transport(String),
}
