use async_graphql::ErrorExtensions;
use moviedb_dal::Error as DalError;
use tracing::{debug, error};

pub type ApiResult<T, E = async_graphql::Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] DalError);

impl ApiError {
    /// Value of `extensions.code` in the GraphQL error
    pub fn code(&self) -> &'static str {
        match &self.0 {
            DalError::RecordNotFound { .. } => "NOT_FOUND",
            DalError::MissingReference { .. } => "REFERENTIAL_INTEGRITY",
            DalError::ValidationError(_) => "VALIDATION",
            DalError::Persistence { .. }
            | DalError::DatabaseError(_)
            | DalError::MigrationError(_) => "PERSISTENCE",
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        if code == "PERSISTENCE" {
            error!("Storage failure: {}", self);
        } else {
            debug!("Request failed ({code}): {}", self);
        }
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

pub trait IntoApiResult<T> {
    fn into_api_result(self) -> ApiResult<T>;
}

impl<T> IntoApiResult<T> for Result<T, DalError> {
    fn into_api_result(self) -> ApiResult<T> {
        self.map_err(|e| ApiError::from(e).extend())
    }
}
