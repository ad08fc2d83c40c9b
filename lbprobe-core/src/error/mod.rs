//! Error types and utilities for lbprobe.
//!
//! The [`BoxError`] type is a type-erased error type that is used wherever it is
//! not that important which specific error is returned, only that one occurred.
//! Errors that callers are expected to match on (such as a failed sampling run)
//! have their own concrete types in the crate that produces them.
//!
//! [`ErrorContext`] adds a human readable context to any error or missing value,
//! so that the final message reads like a trace of what was attempted:
//!
//! ```
//! use lbprobe_core::error::ErrorContext;
//!
//! let result = "hello".parse::<u16>().context("parse port");
//! assert_eq!("parse port: invalid digit found in string", result.unwrap_err().to_string());
//! ```

use std::fmt::{self, Debug, Display};

mod context;
use context::{ContextError, MessageError};

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Extends the `Result` and `Option` types with methods for adding context to errors.
pub trait ErrorContext: private::SealedErrorContext {
    /// The resulting context type after adding context to the contained error.
    type Context;

    /// Add a static context to the contained error.
    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static;

    /// Lazily add a context to the contained error, if it exists.
    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext for Result<T, E>
where
    E: Into<BoxError>,
{
    type Context = Result<T, BoxError>;

    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static,
    {
        self.map_err(|error| ContextError::new(context, error.into()).into())
    }

    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| ContextError::new(context(), error.into()).into())
    }
}

impl<T> ErrorContext for Option<T> {
    type Context = Result<T, BoxError>;

    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| ContextError::new(context, MessageError("Option is None").into()).into())
    }

    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| {
            ContextError::new(context(), MessageError("Option is None").into()).into()
        })
    }
}

/// An error with nothing but a message, or a boxed error whose
/// concrete type is of no further interest.
pub struct OpaqueError(BoxError);

impl OpaqueError {
    /// Create an [`OpaqueError`] from a display object.
    pub fn from_display(msg: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self(Box::new(MessageError(msg)))
    }

    /// Create an [`OpaqueError`] from a boxed error.
    #[must_use]
    pub fn from_boxed(inner: BoxError) -> Self {
        Self(inner)
    }

    /// Box this error.
    #[must_use]
    pub fn into_boxed(self) -> BoxError {
        Box::new(self)
    }
}

impl Debug for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for OpaqueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

mod private {
    pub trait SealedErrorContext {}

    impl<T, E> SealedErrorContext for Result<T, E> where E: Into<super::BoxError> {}
    impl<T> SealedErrorContext for Option<T> {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct CustomError;

    impl Display for CustomError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "custom error")
        }
    }

    impl std::error::Error for CustomError {}

    #[test]
    fn result_context_message() {
        let err = Err::<(), _>(CustomError).context("connect").unwrap_err();
        assert_eq!(err.to_string(), "connect: custom error");
    }

    #[test]
    fn nested_context_keeps_source_chain() {
        let err = Err::<(), _>(CustomError)
            .context("read")
            .with_context(|| format!("iteration #{}", 3))
            .unwrap_err();
        assert_eq!(err.to_string(), "iteration #3: read: custom error");

        let mut depth = 0;
        let mut next: Option<&(dyn std::error::Error + 'static)> = Some(err.as_ref());
        let mut root = None;
        while let Some(current) = next {
            depth += 1;
            root = Some(current);
            next = current.source();
        }
        assert_eq!(depth, 3);
        assert!(root.unwrap().is::<CustomError>());
    }

    #[test]
    fn option_context() {
        let err = None::<u8>.context("peer certificate").unwrap_err();
        assert_eq!(err.to_string(), "peer certificate: Option is None");
        assert_eq!(Some(1u8).context("unused").unwrap(), 1);
    }

    #[test]
    fn opaque_error_display() {
        let err = OpaqueError::from_display("no peer cert information found").into_boxed();
        assert_eq!(err.to_string(), "no peer cert information found");
    }
}
