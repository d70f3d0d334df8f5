//! Explicit outcomes for best-effort external calls.

/// Result of a call to an external service whose failures are tolerated.
///
/// Call sites decide per outcome whether to log, retry or ignore instead of
/// relying on blanket error suppression.
///
/// # Examples
///
/// ```
/// use marquee_core::CallOutcome;
///
/// let found = CallOutcome::Success(3);
/// assert_eq!(found.map(|n| n * 2).into_option(), Some(6));
///
/// let missing: CallOutcome<u32> = CallOutcome::NotFound;
/// assert!(missing.into_option().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome<T> {
    /// The call succeeded
    Success(T),
    /// The service answered that the resource does not exist
    NotFound,
    /// The call failed in a way that may succeed later
    Transient(String),
}

impl<T> CallOutcome<T> {
    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    /// Map the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallOutcome<U> {
        match self {
            CallOutcome::Success(value) => CallOutcome::Success(f(value)),
            CallOutcome::NotFound => CallOutcome::NotFound,
            CallOutcome::Transient(reason) => CallOutcome::Transient(reason),
        }
    }

    /// Discard the failure distinction.
    pub fn into_option(self) -> Option<T> {
        match self {
            CallOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            CallOutcome::Success(_) => "success",
            CallOutcome::NotFound => "not_found",
            CallOutcome::Transient(_) => "transient",
        }
    }
}
