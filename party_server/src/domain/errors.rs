use std::fmt;

// Domain-level errors for party workflows. Every variant is recoverable and
// is reported back to the requesting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyError {
    InvalidName,
    InvalidCode,
    NotFound,
    Full,
    InProgress,
    NotHost,
    NotInParty,
}

impl fmt::Display for PartyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            PartyError::InvalidName => "name must be between 2 and 20 characters",
            PartyError::InvalidCode => "party code must be 6 characters",
            PartyError::NotFound => "party not found",
            PartyError::Full => "party is full",
            PartyError::InProgress => "game already in progress",
            PartyError::NotHost => "only host can start game",
            PartyError::NotInParty => "not in a party",
        };
        f.write_str(message)
    }
}

impl std::error::Error for PartyError {}
