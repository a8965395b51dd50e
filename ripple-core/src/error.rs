//! Error types for the ripple core

use thiserror::Error;

/// Result type alias for ripple operations
pub type Result<T> = std::result::Result<T, RxError>;

/// Boxed error returned by fallible user callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building or running an observable.
///
/// `Producer` travels inside [`Event::Error`](crate::Event::Error) as the
/// terminal event of a subscription. The other variants are returned
/// synchronously by the builder or by `observe`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RxError {
    /// A user callback or a source raised a fault
    #[error("producer error: {0}")]
    Producer(String),

    /// A single-shot source was subscribed to more than once
    #[error("replay not supported: source can only be observed once")]
    ReplayNotSupported,

    /// An argument was rejected at build time
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RxError {
    /// Wrap any displayable fault as a producer error.
    pub fn producer(err: impl std::fmt::Display) -> Self {
        Self::Producer(err.to_string())
    }

    /// Short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Producer(_) => "producer_error",
            Self::ReplayNotSupported => "replay_not_supported",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }

    pub(crate) fn from_panic(context: &str, payload: &(dyn std::any::Any + Send)) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Producer(format!("{context} panicked: {info}"))
    }
}

impl From<BoxError> for RxError {
    fn from(err: BoxError) -> Self {
        Self::Producer(err.to_string())
    }
}
