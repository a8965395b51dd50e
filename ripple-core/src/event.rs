//! The value envelope delivered to subscribers

use crate::error::RxError;

/// One item of a subscription.
///
/// A subscription delivers any number of `Value`s followed by at most one
/// terminal event (`Error` or `Complete`). Nothing follows a terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    Value(T),
    Error(RxError),
    Complete,
}

impl<T> Event<T> {
    /// `true` for `Error` and `Complete`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Value(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error(_))
    }

    /// Borrow the carried value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Event::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Event::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the carried error, if any.
    pub fn error(&self) -> Option<&RxError> {
        match self {
            Event::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Short label for logs: `value`, `error` or `complete`.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Value(_) => "value",
            Event::Error(_) => "error",
            Event::Complete => "complete",
        }
    }
}

impl<T> From<Result<T, RxError>> for Event<T> {
    fn from(res: Result<T, RxError>) -> Self {
        match res {
            Ok(v) => Event::Value(v),
            Err(e) => Event::Error(e),
        }
    }
}
