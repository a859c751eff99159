use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum MalformedReason {
    NotAnObject,
    MissingField(&'static str),
    WrongType { field: &'static str, expected: &'static str },
    MissingCenter,
    BadCoordinate(&'static str),
    DuplicateId(String),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "body is not a JSON object"),
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
            Self::WrongType { field, expected } => {
                write!(f, "field `{field}` should be {expected}")
            }
            Self::MissingCenter => write!(f, "missing `center`"),
            Self::BadCoordinate(axis) => {
                write!(f, "center coordinate `{axis}` is missing or not a number")
            }
            Self::DuplicateId(id) => write!(f, "duplicate body id `{id}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MalformedBody {
    /// Location inside the document, e.g. `/star/children/2`.
    pub path: String,
    pub reason: MalformedReason,
}

impl fmt::Display for MalformedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed body at {}: {}", self.path, self.reason)
    }
}

impl std::error::Error for MalformedBody {}

#[derive(Debug)]
pub enum DocumentError {
    Json(serde_json::Error),
    NotAnObject,
    Empty { rejected: Vec<MalformedBody> },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON document: {err}"),
            Self::NotAnObject => write!(f, "document top level must be an object or array"),
            Self::Empty { rejected } if rejected.is_empty() => {
                write!(f, "document contains no bodies")
            }
            Self::Empty { rejected } => write!(
                f,
                "document contains no valid bodies ({} rejected, first: {})",
                rejected.len(),
                rejected[0]
            ),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
