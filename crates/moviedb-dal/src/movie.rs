use crate::{ChosenDB, Error, error::Result, genre};
use futures::TryStreamExt as _;
use garde::Validate;
use serde::Serialize;
use sqlx::{Acquire, Executor, Pool};
use tracing::debug;

const ENTITY: &str = "Movie";

const SELECT_MOVIE: &str = "SELECT id, title, release_year, director, genre_id FROM movies";

#[derive(Debug, Clone, Validate)]
pub struct CreateMovie {
    #[garde(length(chars, max = 100))]
    pub title: String,
    #[garde(skip)]
    pub release_year: i64,
    #[garde(length(chars, max = 100))]
    pub director: String,
    #[garde(skip)]
    pub genre_id: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_year: i64,
    pub director: String,
    pub genre_id: i64,
}

pub type MovieRepository = MovieRepositoryImpl<Pool<ChosenDB>>;

pub struct MovieRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn list(&self) -> Result<Vec<Movie>> {
        let records = sqlx::query_as::<_, Movie>(SELECT_MOVIE)
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    /// No check that the genre exists, unknown genre just gives empty list.
    pub async fn list_by_genre(&self, genre_id: i64) -> Result<Vec<Movie>> {
        let records = sqlx::query_as::<_, Movie>(&format!("{SELECT_MOVIE} WHERE genre_id = ?"))
            .bind(genre_id)
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        find(id, &self.executor)
            .await?
            .ok_or(Error::RecordNotFound { entity: ENTITY, id })
    }

    pub async fn create(&self, payload: CreateMovie) -> Result<Movie> {
        payload.validate()?;
        let mut transaction = self
            .executor
            .begin()
            .await
            .map_err(Error::persistence("creating movie"))?;
        if genre::find(payload.genre_id, &mut *transaction)
            .await?
            .is_none()
        {
            debug!(genre_id = payload.genre_id, "Refused movie with unknown genre");
            return Err(Error::MissingReference {
                entity: genre::ENTITY,
                id: payload.genre_id,
            });
        }

        let result = sqlx::query(
            "INSERT INTO movies (title, release_year, director, genre_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&payload.title)
        .bind(payload.release_year)
        .bind(&payload.director)
        .bind(payload.genre_id)
        .execute(&mut *transaction)
        .await
        .map_err(Error::persistence("creating movie"))?;
        let id = result.last_insert_rowid();
        transaction
            .commit()
            .await
            .map_err(Error::persistence("creating movie"))?;
        debug!(id, "Created movie");

        Ok(Movie {
            id,
            title: payload.title,
            release_year: payload.release_year,
            director: payload.director,
            genre_id: payload.genre_id,
        })
    }

    /// Overwrites all mutable fields. The new genre is not checked here.
    pub async fn update(&self, id: i64, payload: CreateMovie) -> Result<Movie> {
        payload.validate()?;
        let mut transaction = self
            .executor
            .begin()
            .await
            .map_err(Error::persistence("updating movie"))?;
        if find(id, &mut *transaction).await?.is_none() {
            return Err(Error::RecordNotFound { entity: ENTITY, id });
        }
        sqlx::query(
            "UPDATE movies SET title = ?, release_year = ?, director = ?, genre_id = ? WHERE id = ?",
        )
        .bind(&payload.title)
        .bind(payload.release_year)
        .bind(&payload.director)
        .bind(payload.genre_id)
        .bind(id)
        .execute(&mut *transaction)
        .await
        .map_err(Error::persistence("updating movie"))?;
        let record = find(id, &mut *transaction)
            .await?
            .ok_or(Error::RecordNotFound { entity: ENTITY, id })?;
        transaction
            .commit()
            .await
            .map_err(Error::persistence("updating movie"))?;
        debug!(id, "Updated movie");
        Ok(record)
    }

    /// Returns the movie as it was before deletion.
    pub async fn delete(&self, id: i64) -> Result<Movie> {
        let mut transaction = self
            .executor
            .begin()
            .await
            .map_err(Error::persistence("deleting movie"))?;
        let record = find(id, &mut *transaction)
            .await?
            .ok_or(Error::RecordNotFound { entity: ENTITY, id })?;
        sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&mut *transaction)
            .await
            .map_err(Error::persistence("deleting movie"))?;
        transaction
            .commit()
            .await
            .map_err(Error::persistence("deleting movie"))?;
        debug!(id, "Deleted movie");
        Ok(record)
    }
}

async fn find<'c, E>(id: i64, executor: E) -> Result<Option<Movie>>
where
    E: Executor<'c, Database = ChosenDB>,
{
    let record = sqlx::query_as::<_, Movie>(&format!("{SELECT_MOVIE} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(record)
}
