use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Where a setup failure came from: which setting, what value, which resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Setting name as the user supplies it, e.g. `PLAYPASS_TOKEN`.
    pub setting: Option<String>,
    /// The rejected value, when it is safe to echo.
    pub value: Option<String>,
    /// Component that raised the error, e.g. `credential_resolver`.
    pub origin: Option<String>,
}

impl ErrorContext {
    pub fn for_setting(setting: impl Into<String>) -> Self {
        Self {
            setting: Some(setting.into()),
            ..Self::default()
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.setting.is_none() && self.value.is_none() && self.origin.is_none()
    }
}

/// Renders as ` (setting: X, value: Y, origin: Z)`, or nothing when empty.
impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let parts: Vec<String> = [
            ("setting", &self.setting),
            ("value", &self.value),
            ("origin", &self.origin),
        ]
        .iter()
        .filter_map(|(label, v)| v.as_ref().map(|v| format!("{}: {}", label, v)))
        .collect();
        write!(f, " ({})", parts.join(", "))
    }
}

/// Unified error type for the runner.
///
/// Only setup paths surface this type. Once a session is running, failures are
/// folded into [`crate::client::Outcome`] at the client boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    pub fn configuration(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            Error::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_renders_context() {
        let err = Error::configuration(
            "no session token",
            ErrorContext::for_setting("PLAYPASS_TOKEN").origin("credential_resolver"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: no session token (setting: PLAYPASS_TOKEN, origin: credential_resolver)"
        );
        assert_eq!(
            err.context().and_then(|c| c.setting.as_deref()),
            Some("PLAYPASS_TOKEN")
        );
    }

    #[test]
    fn empty_context_adds_nothing() {
        let err = Error::configuration("bad", ErrorContext::default());
        assert_eq!(err.to_string(), "Configuration error: bad");
    }

    #[test]
    fn transport_failure_converts_without_context() {
        let err: Error = TransportError::Other("invalid proxy".into()).into();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(
            err.to_string(),
            "Network transport error: Transport error: invalid proxy"
        );
        assert!(err.context().is_none());
    }
}
