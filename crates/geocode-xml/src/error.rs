use thiserror::Error;

use crate::state::ParseState;

/// Why a geocode response could not be turned into locations.
///
/// Per-field numeric failures and unknown elements are recovered inside the
/// parser and never show up here.
#[derive(Debug, Error)]
pub enum GeocodeParseError {
    /// The byte stream is not well-formed XML.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// The document is well-formed but does not have the expected shape.
    #[error("{message} (in {state}, at byte {position})")]
    Structure {
        state: ParseState,
        position: u64,
        message: String,
    },

    /// The input ended while an element was still open.
    #[error("premature end of document (in {state}, at byte {position})")]
    UnexpectedEof { state: ParseState, position: u64 },

    /// The service answered with `resultCode="FAILED"`.
    #[error("geocoding service reported failure: {0}")]
    ServiceFailure(String),
}

impl GeocodeParseError {
    /// Parser state at the point of failure, where one is recorded.
    #[must_use]
    pub fn state(&self) -> Option<ParseState> {
        match self {
            GeocodeParseError::Structure { state, .. }
            | GeocodeParseError::UnexpectedEof { state, .. } => Some(*state),
            GeocodeParseError::Xml { .. } | GeocodeParseError::ServiceFailure(_) => None,
        }
    }

    /// Byte offset into the input, where one is recorded.
    #[must_use]
    pub fn position(&self) -> Option<u64> {
        match self {
            GeocodeParseError::Xml { position, .. }
            | GeocodeParseError::Structure { position, .. }
            | GeocodeParseError::UnexpectedEof { position, .. } => Some(*position),
            GeocodeParseError::ServiceFailure(_) => None,
        }
    }
}
