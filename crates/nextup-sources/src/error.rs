use thiserror::Error;

/// Upstream failures a caller may want to tell apart from plain transport
/// errors. Everything else travels as `anyhow::Error` with context.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{service} returned HTTP {status} for {url}")]
    Status {
        service: &'static str,
        status: u16,
        url: String,
    },

    #[error("{service} login failed: {message}")]
    Auth { service: &'static str, message: String },
}
