mod mutation;
mod query;
pub mod types;

use async_graphql::{http::GraphiQLSource, EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use moviedb_dal::{genre::GenreRepository, movie::MovieRepository, Pool};

pub use mutation::Mutation;
pub use query::Query;

use crate::{repository_from_context, state::AppState};

pub const GRAPHQL_PATH: &str = "/graphql";

pub type MovieSchema = Schema<Query, Mutation, EmptySubscription>;

/// Builds repository for single resolver call from pool in schema data
pub trait FromContext: Sized {
    fn from_context(ctx: &async_graphql::Context<'_>) -> async_graphql::Result<Self>;
}

repository_from_context!(MovieRepository);
repository_from_context!(GenreRepository);

pub fn build_schema(pool: Pool) -> MovieSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(pool)
        .finish()
}

pub async fn graphql_handler(State(state): State<AppState>, req: GraphQLRequest) -> GraphQLResponse {
    state.schema().execute(req.into_inner()).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

pub fn router(graphiql_enabled: bool) -> axum::Router<AppState> {
    let route = if graphiql_enabled {
        get(graphiql).post(graphql_handler)
    } else {
        get(graphql_handler).post(graphql_handler)
    };
    axum::Router::new().route(GRAPHQL_PATH, route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt as _;
    use tracing_test::traced_test;

    async fn test_pool() -> Pool {
        let pool = moviedb_dal::new_memory_pool().await.unwrap();
        moviedb_dal::migrate(&pool).await.unwrap();
        pool
    }

    async fn execute(schema: &MovieSchema, query: &str) -> Value {
        let response = schema.execute(query).await;
        serde_json::to_value(&response).unwrap()
    }

    fn error_code(response: &Value) -> &str {
        response["errors"][0]["extensions"]["code"]
            .as_str()
            .expect("missing error code")
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_movie_scenario() {
        let schema = build_schema(test_pool().await);

        let res = execute(&schema, r#"mutation { createGenre(name: "Sci-Fi") { id name } }"#).await;
        assert_eq!(res["data"]["createGenre"], json!({"id": 1, "name": "Sci-Fi"}));

        let res = execute(
            &schema,
            r#"mutation {
                createMovie(title: "Dune", releaseYear: 2021, director: "Villeneuve", genreId: 1) {
                    id title releaseYear director genreId genre { id name }
                }
            }"#,
        )
        .await;
        assert!(res.get("errors").is_none(), "{res}");
        assert_eq!(
            res["data"]["createMovie"],
            json!({
                "id": 1,
                "title": "Dune",
                "releaseYear": 2021,
                "director": "Villeneuve",
                "genreId": 1,
                "genre": {"id": 1, "name": "Sci-Fi"}
            })
        );

        let res = execute(&schema, "{ genresByMovie(movieId: 1) { id name } }").await;
        assert_eq!(
            res["data"]["genresByMovie"],
            json!([{"id": 1, "name": "Sci-Fi"}])
        );

        let res = execute(&schema, "{ genres { name movies { title } } }").await;
        assert_eq!(
            res["data"]["genres"],
            json!([{"name": "Sci-Fi", "movies": [{"title": "Dune"}]}])
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_movie_unknown_genre() {
        let schema = build_schema(test_pool().await);

        let res = execute(
            &schema,
            r#"mutation {
                createMovie(title: "Dune", releaseYear: 2021, director: "Villeneuve", genreId: 999) { id }
            }"#,
        )
        .await;
        assert_eq!(res["data"], Value::Null);
        assert_eq!(error_code(&res), "REFERENTIAL_INTEGRITY");
        assert_eq!(
            res["errors"][0]["message"],
            json!("Genre with id 999 does not exist.")
        );

        let res = execute(&schema, "{ movies { id } }").await;
        assert_eq!(res["data"]["movies"], json!([]));
    }

    #[tokio::test]
    async fn test_genre_rename() {
        let schema = build_schema(test_pool().await);

        let res = execute(&schema, r#"mutation { createGenre(name: "Drama") { id } }"#).await;
        let id = res["data"]["createGenre"]["id"].as_i64().unwrap();

        let res = execute(
            &schema,
            &format!(r#"mutation {{ updateGenre(id: {id}, name: "Thriller") {{ id name }} }}"#),
        )
        .await;
        assert_eq!(res["data"]["updateGenre"]["name"], json!("Thriller"));

        let res = execute(&schema, "{ genres { name } }").await;
        assert_eq!(res["data"]["genres"], json!([{"name": "Thriller"}]));
    }

    #[tokio::test]
    async fn test_missing_ids_fail() {
        let schema = build_schema(test_pool().await);

        let mutations = [
            r#"mutation { updateMovie(id: 7, title: "X", releaseYear: 1999, director: "Y", genreId: 1) { id } }"#,
            "mutation { deleteMovie(id: 7) { id } }",
            r#"mutation { updateGenre(id: 7, name: "X") { id } }"#,
            "mutation { deleteGenre(id: 7) { id } }",
        ];
        for mutation in mutations {
            let res = execute(&schema, mutation).await;
            assert_eq!(res["data"], Value::Null, "{mutation}");
            assert_eq!(error_code(&res), "NOT_FOUND", "{mutation}");
        }

        let res = execute(&schema, "{ movies { id } genres { id } }").await;
        assert_eq!(res["data"], json!({"movies": [], "genres": []}));
    }

    #[tokio::test]
    async fn test_update_and_delete_movie() {
        let schema = build_schema(test_pool().await);
        execute(&schema, r#"mutation { createGenre(name: "Sci-Fi") { id } }"#).await;
        execute(&schema, r#"mutation { createGenre(name: "Drama") { id } }"#).await;
        execute(
            &schema,
            r#"mutation { createMovie(title: "Dune", releaseYear: 2021, director: "Villeneuve", genreId: 1) { id } }"#,
        )
        .await;
        execute(
            &schema,
            r#"mutation { createMovie(title: "Arrival", releaseYear: 2016, director: "Villeneuve", genreId: 1) { id } }"#,
        )
        .await;

        let res = execute(
            &schema,
            r#"mutation {
                updateMovie(id: 2, title: "Arrival", releaseYear: 2016, director: "Denis Villeneuve", genreId: 2) {
                    director genre { name }
                }
            }"#,
        )
        .await;
        assert_eq!(
            res["data"]["updateMovie"],
            json!({"director": "Denis Villeneuve", "genre": {"name": "Drama"}})
        );

        let res = execute(&schema, "{ moviesByGenre(genreId: 1) { id } }").await;
        assert_eq!(res["data"]["moviesByGenre"], json!([{"id": 1}]));

        let res = execute(&schema, "mutation { deleteMovie(id: 1) { id title } }").await;
        assert_eq!(res["data"]["deleteMovie"], json!({"id": 1, "title": "Dune"}));

        let res = execute(&schema, "{ movies { id } }").await;
        assert_eq!(res["data"]["movies"], json!([{"id": 2}]));

        let res = execute(&schema, "{ moviesByGenre(genreId: 1) { id } }").await;
        assert_eq!(res["data"]["moviesByGenre"], json!([]));
    }

    #[tokio::test]
    async fn test_delete_genre_returns_snapshot() {
        let schema = build_schema(test_pool().await);
        execute(&schema, r#"mutation { createGenre(name: "Western") { id } }"#).await;

        let res = execute(&schema, "mutation { deleteGenre(id: 1) { id name movies { id } } }").await;
        assert_eq!(
            res["data"]["deleteGenre"],
            json!({"id": 1, "name": "Western", "movies": []})
        );
        let res = execute(&schema, "{ genres { id } }").await;
        assert_eq!(res["data"]["genres"], json!([]));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_storage_constraint_errors() {
        let schema = build_schema(test_pool().await);
        execute(&schema, r#"mutation { createGenre(name: "Sci-Fi") { id } }"#).await;
        execute(
            &schema,
            r#"mutation { createMovie(title: "Dune", releaseYear: 2021, director: "Villeneuve", genreId: 1) { id } }"#,
        )
        .await;

        let res = execute(
            &schema,
            r#"mutation {
                updateMovie(id: 1, title: "Dune", releaseYear: 2021, director: "Villeneuve", genreId: 55) { id }
            }"#,
        )
        .await;
        assert_eq!(error_code(&res), "PERSISTENCE");
        assert!(
            res["errors"][0]["message"]
                .as_str()
                .unwrap()
                .starts_with("Error updating movie:"),
            "{res}"
        );

        let res = execute(&schema, "mutation { deleteGenre(id: 1) { id } }").await;
        assert_eq!(error_code(&res), "PERSISTENCE");
        assert!(
            res["errors"][0]["message"]
                .as_str()
                .unwrap()
                .starts_with("Error deleting genre:"),
            "{res}"
        );

        let res = execute(&schema, "{ movies { id genreId genre { name } } }").await;
        assert_eq!(
            res["data"]["movies"],
            json!([{"id": 1, "genreId": 1, "genre": {"name": "Sci-Fi"}}])
        );
    }

    #[tokio::test]
    async fn test_validation_error() {
        let schema = build_schema(test_pool().await);
        let name = "x".repeat(101);
        let res = execute(
            &schema,
            &format!(r#"mutation {{ createGenre(name: "{name}") {{ id }} }}"#),
        )
        .await;
        assert_eq!(error_code(&res), "VALIDATION");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_router_post_and_graphiql() {
        let pool = test_pool().await;
        let state = AppState::new(AppConfig { graphiql: true }, pool);
        let app = router(true).with_state(state);

        let body = json!({"query": r#"mutation { createGenre(name: "Noir") { id name } }"#});
        let request = Request::builder()
            .method("POST")
            .uri(GRAPHQL_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let res: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(res["data"]["createGenre"], json!({"id": 1, "name": "Noir"}));

        let request = Request::builder()
            .method("GET")
            .uri(GRAPHQL_PATH)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.to_lowercase().contains("graphiql"));
    }
}
