use async_graphql::{Context, Object};
use moviedb_dal::{
    genre::{CreateGenre, GenreRepository},
    movie::{CreateMovie, MovieRepository},
};
use tracing::info;

use super::{
    types::{Genre, Movie},
    FromContext as _,
};
use crate::error::{ApiResult, IntoApiResult as _};

#[derive(Default)]
pub struct Mutation;

#[Object]
impl Mutation {
    /// Fails when the genre does not exist
    async fn create_movie(
        &self,
        ctx: &Context<'_>,
        title: String,
        release_year: i64,
        director: String,
        genre_id: i64,
    ) -> ApiResult<Movie> {
        let repository = MovieRepository::from_context(ctx)?;
        let movie = repository
            .create(CreateMovie {
                title,
                release_year,
                director,
                genre_id,
            })
            .await
            .into_api_result()?;
        info!(id = movie.id, title = %movie.title, "Movie created");
        Ok(movie.into())
    }

    /// Replaces all fields of the movie
    async fn update_movie(
        &self,
        ctx: &Context<'_>,
        id: i64,
        title: String,
        release_year: i64,
        director: String,
        genre_id: i64,
    ) -> ApiResult<Movie> {
        let repository = MovieRepository::from_context(ctx)?;
        let movie = repository
            .update(
                id,
                CreateMovie {
                    title,
                    release_year,
                    director,
                    genre_id,
                },
            )
            .await
            .into_api_result()?;
        info!(id, "Movie updated");
        Ok(movie.into())
    }

    /// Returns the deleted movie
    async fn delete_movie(&self, ctx: &Context<'_>, id: i64) -> ApiResult<Movie> {
        let repository = MovieRepository::from_context(ctx)?;
        let movie = repository.delete(id).await.into_api_result()?;
        info!(id, "Movie deleted");
        Ok(movie.into())
    }

    async fn create_genre(&self, ctx: &Context<'_>, name: String) -> ApiResult<Genre> {
        let repository = GenreRepository::from_context(ctx)?;
        let genre = repository
            .create(CreateGenre { name })
            .await
            .into_api_result()?;
        info!(id = genre.id, name = %genre.name, "Genre created");
        Ok(genre.into())
    }

    async fn update_genre(&self, ctx: &Context<'_>, id: i64, name: String) -> ApiResult<Genre> {
        let repository = GenreRepository::from_context(ctx)?;
        let genre = repository
            .update(id, CreateGenre { name })
            .await
            .into_api_result()?;
        info!(id, "Genre updated");
        Ok(genre.into())
    }

    /// Returns the deleted genre
    async fn delete_genre(&self, ctx: &Context<'_>, id: i64) -> ApiResult<Genre> {
        let repository = GenreRepository::from_context(ctx)?;
        let genre = repository.delete(id).await.into_api_result()?;
        info!(id, "Genre deleted");
        Ok(genre.into())
    }
}
