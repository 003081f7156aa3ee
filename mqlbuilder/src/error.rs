use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a builder can report. All construction errors are raised
/// by the constructor of the offending stage or operator; nothing is
/// deferred to render time except cycle detection, which depends on the
/// whole expression tree.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("{owner}: missing required operand `{field}`")]
    MissingOperand { owner: &'static str, field: String },
    #[error("{owner}: invalid operand `{field}`: {reason}")]
    InvalidOperand {
        owner: &'static str,
        field: String,
        reason: String,
    },
    #[error("{owner}: unexpected field `{field}`, {}", expected_fields(.expected))]
    UnexpectedField {
        owner: &'static str,
        field: String,
        expected: String,
    },
    #[error("cyclic expression detected while resolving {tag} at depth {depth}")]
    CyclicExpression { tag: &'static str, depth: usize },
    #[error("pipeline execution failed: {0}")]
    Execution(String),
}

fn expected_fields(expected: &str) -> String {
    if expected.is_empty() {
        "it takes no fields".to_string()
    } else {
        format!("expected one of: {expected}")
    }
}

impl Error {
    pub(crate) fn missing(owner: &'static str, field: impl Into<String>) -> Self {
        Error::MissingOperand {
            owner,
            field: field.into(),
        }
    }

    pub(crate) fn invalid(
        owner: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidOperand {
            owner,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// UserError exposes an error as a stable numeric code, an optional
/// message aimed at the person who wrote the pipeline, and a message with
/// the full technical detail.
pub trait UserError {
    fn code(&self) -> u32;
    fn user_message(&self) -> Option<String>;
    fn technical_message(&self) -> String;
}

impl UserError for Error {
    fn code(&self) -> u32 {
        match self {
            Error::MissingOperand { .. } => 1001,
            Error::InvalidOperand { .. } => 1002,
            Error::UnexpectedField { .. } => 1003,
            Error::CyclicExpression { .. } => 1004,
            Error::Execution(_) => 2001,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            Error::MissingOperand { owner, field } => Some(format!(
                "{owner} requires `{field}` to be supplied and non-empty"
            )),
            Error::InvalidOperand { owner, field, .. } => {
                Some(format!("the value supplied for `{field}` in {owner} is not allowed"))
            }
            Error::UnexpectedField { owner, field, .. } => {
                Some(format!("{owner} does not accept a field named `{field}`"))
            }
            Error::CyclicExpression { .. } => {
                Some("an expression refers back to itself and cannot be rendered".to_string())
            }
            Error::Execution(_) => None,
        }
    }

    fn technical_message(&self) -> String {
        self.to_string()
    }
}
