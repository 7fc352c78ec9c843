use std::fmt;

/// Rejected level-up choices. The simulation state is untouched on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceError {
    NoPendingChoice,
    UnknownSkill,
    EnhancementRequired,
    UnexpectedEnhancement,
}

impl fmt::Display for ChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceError::NoPendingChoice => write!(f, "no level-up choice is pending"),
            ChoiceError::UnknownSkill => write!(f, "unknown skill"),
            ChoiceError::EnhancementRequired => {
                write!(f, "this level requires an enhancement choice")
            }
            ChoiceError::UnexpectedEnhancement => {
                write!(f, "enhancements are only offered at tier boundaries")
            }
        }
    }
}

impl std::error::Error for ChoiceError {}

/// Failures talking to the party broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    Connect(String),
    /// No reply within the request timeout; safe to retry.
    Timeout,
    /// The broker answered with an error message.
    Rejected(String),
    /// The connection is gone.
    Closed,
    Protocol(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Connect(err) => write!(f, "broker connect error: {err}"),
            ClientError::Timeout => write!(f, "broker request timed out"),
            ClientError::Rejected(message) => write!(f, "broker rejected request: {message}"),
            ClientError::Closed => write!(f, "broker connection closed"),
            ClientError::Protocol(err) => write!(f, "broker protocol error: {err}"),
        }
    }
}

impl std::error::Error for ClientError {}
