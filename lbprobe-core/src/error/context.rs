use super::BoxError;
use std::fmt::{self, Debug, Display};

pub(super) struct ContextError<M> {
    context: M,
    source: BoxError,
}

impl<M> ContextError<M> {
    pub(super) fn new(context: M, source: BoxError) -> Self {
        Self { context, source }
    }
}

impl<M: Display> Debug for ContextError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextError")
            .field("context", &format_args!("{}", self.context))
            .field("source", &self.source)
            .finish()
    }
}

impl<M: Display> Display for ContextError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl<M: Display> std::error::Error for ContextError<M> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

#[repr(transparent)]
pub(super) struct MessageError<M>(pub(super) M);

impl<M: Debug> Debug for MessageError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl<M: Display> Display for MessageError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<M> std::error::Error for MessageError<M> where M: Display + Debug {}
