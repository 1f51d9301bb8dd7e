use crate::value::ValueKind;

/// Library-local result type.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised by filter registration, toggling and predicate binding.
///
/// All variants describe caller or configuration mistakes; none is transient
/// and none should be retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("unknown parameter '{param}' for filter '{filter}'")]
    UnknownParameter { filter: String, param: String },

    #[error("type mismatch for '{filter}.{param}': expected {expected}, got {got}")]
    TypeMismatch {
        filter: String,
        param: String,
        expected: ValueKind,
        got: &'static str,
    },

    #[error("duplicate filter name: {0}")]
    DuplicateFilterName(String),

    #[error("filter registry is frozen, cannot register or override '{0}'")]
    RegistrationClosed(String),

    #[error("filter registry must be frozen before a unit of work begins")]
    RegistryNotFrozen,

    #[error("entity '{entity}' does not expose field '{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid filter configuration: {0}")]
    Config(String),
}
