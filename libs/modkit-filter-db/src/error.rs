use modkit_filter::FilterError;

/// Errors that can occur while building or executing a filtered query.
#[derive(thiserror::Error, Debug)]
pub enum FilterDbError {
    /// Database error occurred during query execution.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// Filter engine rejected the request (unknown filter, bad parameter, ...).
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// An enabled filter references a field the entity maps to no column.
    #[error("entity '{entity}' has no column for field '{field}'")]
    UnmappedField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("entity '{0}' is not soft-deletable")]
    NotSoftDeletable(&'static str),

    #[error("invalid query: {0}")]
    Invalid(&'static str),
}
