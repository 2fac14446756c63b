pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    ValidationError(#[from] garde::Report),

    #[error("{entity} with id {id} not found.")]
    RecordNotFound { entity: &'static str, id: i64 },

    #[error("{entity} with id {id} does not exist.")]
    MissingReference { entity: &'static str, id: i64 },

    #[error("Error {action}: {source}")]
    Persistence {
        action: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl Error {
    pub(crate) fn persistence(action: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Error::Persistence { action, source }
    }
}
