use std::sync::Arc;

use moviedb_dal::Pool;

use crate::graphql::{build_schema, MovieSchema};

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Self {
        let schema = build_schema(pool.clone());
        AppState {
            state: Arc::new(AppStateInner {
                app_config,
                pool,
                schema,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn schema(&self) -> &MovieSchema {
        &self.state.schema
    }
}

struct AppStateInner {
    pool: Pool,
    schema: MovieSchema,
    app_config: AppConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Serve GraphiQL explorer on GET requests
    pub graphiql: bool,
}
