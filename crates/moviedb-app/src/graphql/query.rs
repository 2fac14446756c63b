use async_graphql::{Context, Object};
use moviedb_dal::{genre::GenreRepository, movie::MovieRepository};

use super::{
    types::{Genre, Movie},
    FromContext as _,
};
use crate::error::{ApiResult, IntoApiResult as _};

#[derive(Default)]
pub struct Query;

#[Object]
impl Query {
    async fn movies(&self, ctx: &Context<'_>) -> ApiResult<Vec<Movie>> {
        let repository = MovieRepository::from_context(ctx)?;
        let movies = repository.list().await.into_api_result()?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }

    async fn genres(&self, ctx: &Context<'_>) -> ApiResult<Vec<Genre>> {
        let repository = GenreRepository::from_context(ctx)?;
        let genres = repository.list().await.into_api_result()?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }

    /// Empty list for unknown genre
    async fn movies_by_genre(&self, ctx: &Context<'_>, genre_id: i64) -> ApiResult<Vec<Movie>> {
        let repository = MovieRepository::from_context(ctx)?;
        let movies = repository.list_by_genre(genre_id).await.into_api_result()?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }

    /// Genre of the movie as a list, empty for unknown movie
    async fn genres_by_movie(&self, ctx: &Context<'_>, movie_id: i64) -> ApiResult<Vec<Genre>> {
        let repository = GenreRepository::from_context(ctx)?;
        let genres = repository.list_by_movie(movie_id).await.into_api_result()?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }
}
