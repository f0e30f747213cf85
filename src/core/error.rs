use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Internal,
    Config,
    InvalidQuery,
    InvalidFilterSyntax,
    InvalidFilterAttribute,
    InvalidFacetsDistribution,
    MissingPrimaryKey,
    InvalidDocumentId,
    DocumentNotFound,
    Timeout,
}

impl ErrorKind {
    /// Error code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Internal => "internal",
            ErrorKind::Config => "invalid_config",
            ErrorKind::InvalidQuery => "bad_request",
            ErrorKind::InvalidFilterSyntax => "invalid_filter",
            ErrorKind::InvalidFilterAttribute => "invalid_filter_attribute",
            ErrorKind::InvalidFacetsDistribution => "invalid_facets_distribution",
            ErrorKind::MissingPrimaryKey => "missing_primary_key",
            ErrorKind::InvalidDocumentId => "invalid_document_id",
            ErrorKind::DocumentNotFound => "document_not_found",
            ErrorKind::Timeout => "search_timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::InvalidQuery,
            context: err.to_string(),
        }
    }
}

impl From<fst::Error> for Error {
    fn from(err: fst::Error) -> Self {
        Error {
            kind: ErrorKind::Internal,
            context: format!("FST error: {}", err),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error {
            kind: ErrorKind::Config,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
