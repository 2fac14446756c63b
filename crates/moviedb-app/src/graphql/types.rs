use async_graphql::{ComplexObject, Context, SimpleObject};
use moviedb_dal::{genre::GenreRepository, movie::MovieRepository};

use super::FromContext as _;
use crate::error::{ApiResult, IntoApiResult as _};

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_year: i64,
    pub director: String,
    pub genre_id: i64,
}

#[ComplexObject]
impl Movie {
    /// Null when the referenced genre no longer exists
    async fn genre(&self, ctx: &Context<'_>) -> ApiResult<Option<Genre>> {
        let repository = GenreRepository::from_context(ctx)?;
        let genre = repository.find(self.genre_id).await.into_api_result()?;
        Ok(genre.map(Genre::from))
    }
}

impl From<moviedb_dal::movie::Movie> for Movie {
    fn from(value: moviedb_dal::movie::Movie) -> Self {
        Self {
            id: value.id,
            title: value.title,
            release_year: value.release_year,
            director: value.director,
            genre_id: value.genre_id,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[ComplexObject]
impl Genre {
    async fn movies(&self, ctx: &Context<'_>) -> ApiResult<Vec<Movie>> {
        let repository = MovieRepository::from_context(ctx)?;
        let movies = repository.list_by_genre(self.id).await.into_api_result()?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }
}

impl From<moviedb_dal::genre::Genre> for Genre {
    fn from(value: moviedb_dal::genre::Genre) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}
