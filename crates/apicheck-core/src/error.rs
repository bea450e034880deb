use thiserror::Error;

/// Raised by an [`IntrospectionProvider`](crate::IntrospectionProvider).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("{0}.class could not be found")]
    NotFound(String),
    #[error("{name}.class could not be loaded: {message}")]
    Malformed { name: String, message: String },
}

impl LoadError {
    /// The type name whose lookup failed.
    pub fn name(&self) -> &str {
        match self {
            LoadError::NotFound(name) => name,
            LoadError::Malformed { name, .. } => name,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("wildcard declares both an upper bound ({upper}) and a lower bound ({lower})")]
    ConflictingWildcardBounds { upper: String, lower: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error(
        "reference name {reference} is already aliased to {existing}; refusing to alias it to {requested}"
    )]
    AliasCollision {
        reference: String,
        existing: String,
        requested: String,
    },
}

/// Fatal for one candidate/reference pair; no partial report is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    #[error("{0} cannot be checked against itself")]
    SameType(String),
}
