use std::fmt;

/// Where the walker is in the `places` document.
///
/// `Done` and `Failed` are terminal; every run ends in exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Init,
    InRoot,
    InPlace,
    InLocation,
    InAddress,
    InCoordinate,
    InBounds,
    Done,
    Failed,
}

impl ParseState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ParseState::Done | ParseState::Failed)
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParseState::Init => "document prolog",
            ParseState::InRoot => "element \"places\"",
            ParseState::InPlace => "element \"place\"",
            ParseState::InLocation => "element \"location\"",
            ParseState::InAddress => "element \"address\"",
            ParseState::InCoordinate => "coordinate element",
            ParseState::InBounds => "element \"boundingBox\"",
            ParseState::Done => "finished document",
            ParseState::Failed => "failed document",
        };
        f.write_str(label)
    }
}
