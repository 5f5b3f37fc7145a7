//! Presentation-facing wrapper around an accessor result.

use std::future::Future;

use crate::error::{ContentError, Result};

/// State of one view for a page section: a value once loaded, a pending
/// flag while loading, and the error if the load failed.
#[derive(Debug, Clone)]
pub struct AsyncData<T> {
    value: Option<T>,
    pending: bool,
    error: Option<ContentError>,
}

impl<T> AsyncData<T> {
    pub fn pending() -> Self {
        Self {
            value: None,
            pending: true,
            error: None,
        }
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self {
                value: Some(value),
                pending: false,
                error: None,
            },
            Err(error) => Self {
                value: None,
                pending: false,
                error: Some(error),
            },
        }
    }

    /// Await an accessor and capture its outcome.
    pub async fn load(future: impl Future<Output = Result<T>>) -> Self {
        Self::from_result(future.await)
    }

    /// The loaded value; `None` while pending or after a failure.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn error(&self) -> Option<&ContentError> {
        self.error.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T: Default> AsyncData<T> {
    /// The value, or the empty fallback a section renders while pending or failed.
    pub fn value_or_default(self) -> T {
        self.value.unwrap_or_default()
    }
}

impl<T> Default for AsyncData<T> {
    fn default() -> Self {
        Self::pending()
    }
}
