use std::collections::BTreeMap;
use std::fmt;

/// A rejected form submission: one human-readable message plus, where the
/// form asks for it, the raw values to re-populate the inputs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRejection {
    pub message: String,
    pub echo: BTreeMap<String, String>,
}

impl FormRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            echo: BTreeMap::new(),
        }
    }

    pub fn with_echo(mut self, echo: BTreeMap<String, String>) -> Self {
        self.echo = echo;
        self
    }
}

impl fmt::Display for FormRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every way a marketplace operation can be refused. The `Display` output is
/// the message shown to the end user; store causes are logged, not shown.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("{0}")]
    Validation(FormRejection),
    #[error("Login is required.")]
    Unauthenticated,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(FormRejection),
    #[error("{0}")]
    Persistence(FormRejection),
}

impl MarketError {
    /// Raw field values to hand back to the form, if any.
    pub fn echo(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Validation(r) | Self::Conflict(r) | Self::Persistence(r) if !r.echo.is_empty() => {
                Some(&r.echo)
            }
            _ => None,
        }
    }

    pub(crate) fn persistence(message: &'static str) -> Self {
        Self::Persistence(FormRejection::new(message))
    }
}

impl From<FormRejection> for MarketError {
    fn from(value: FormRejection) -> Self {
        Self::Validation(value)
    }
}
