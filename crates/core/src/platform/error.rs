use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    pub kind: PlatformErrorKind,
    pub message: Option<String>,
}

impl PlatformError {
    pub fn new(kind: PlatformErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: Some(message.into()) }
    }

    pub fn simple(kind: PlatformErrorKind) -> Self {
        Self { kind, message: None }
    }

    /// Whether the failure is an expected startup/teardown race that the next
    /// reconciliation will retry, as opposed to a real platform fault.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            PlatformErrorKind::WindowUnavailable | PlatformErrorKind::InputSourceUnavailable
        )
    }
}

impl Display for PlatformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{msg}"),
            None => write!(f, "{:#?}", self.kind),
        }
    }
}

impl Error for PlatformError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// The window is gone or not yet created.
    WindowUnavailable,
    /// The non-client input source for a window could not be resolved.
    InputSourceUnavailable,
    /// A platform call returned a failure.
    OperationFailed,
    UnsupportedPlatform,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PlatformErrorKind::WindowUnavailable, true)]
    #[case(PlatformErrorKind::InputSourceUnavailable, true)]
    #[case(PlatformErrorKind::OperationFailed, false)]
    #[case(PlatformErrorKind::UnsupportedPlatform, false)]
    fn transient_kinds(#[case] kind: PlatformErrorKind, #[case] transient: bool) {
        assert_eq!(PlatformError::simple(kind).is_transient(), transient);
    }

    #[test]
    fn display_prefers_message() {
        let err = PlatformError::new(PlatformErrorKind::OperationFailed, "SetWindowSubclass failed");
        assert_eq!(err.to_string(), "SetWindowSubclass failed");
        assert_eq!(PlatformError::simple(PlatformErrorKind::OperationFailed).to_string(), "OperationFailed");
    }
}
