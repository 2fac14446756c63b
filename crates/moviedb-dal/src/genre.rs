use crate::{ChosenDB, Error, error::Result};
use futures::TryStreamExt as _;
use garde::Validate;
use serde::Serialize;
use sqlx::{Acquire, Executor, Pool};
use tracing::debug;

pub(crate) const ENTITY: &str = "Genre";

#[derive(Debug, Clone, Validate)]
pub struct CreateGenre {
    #[garde(length(chars, max = 100))]
    pub name: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

pub type GenreRepository = GenreRepositoryImpl<Pool<ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn list(&self) -> Result<Vec<Genre>> {
        let records = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres")
            .fetch(&self.executor)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    /// Genres reachable through the movie, at most one as a movie has single genre.
    pub async fn list_by_movie(&self, movie_id: i64) -> Result<Vec<Genre>> {
        let records = sqlx::query_as::<_, Genre>(
            "SELECT g.id, g.name FROM genres g JOIN movies m ON m.genre_id = g.id WHERE m.id = ?",
        )
        .bind(movie_id)
        .fetch(&self.executor)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        find(id, &self.executor)
            .await?
            .ok_or(Error::RecordNotFound { entity: ENTITY, id })
    }

    pub async fn find(&self, id: i64) -> Result<Option<Genre>> {
        find(id, &self.executor).await
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        payload.validate()?;
        let mut transaction = self
            .executor
            .begin()
            .await
            .map_err(Error::persistence("adding genre"))?;
        let result = sqlx::query("INSERT INTO genres (name) VALUES (?)")
            .bind(&payload.name)
            .execute(&mut *transaction)
            .await
            .map_err(Error::persistence("adding genre"))?;
        let id = result.last_insert_rowid();
        transaction
            .commit()
            .await
            .map_err(Error::persistence("adding genre"))?;
        debug!(id, "Created genre");

        Ok(Genre {
            id,
            name: payload.name,
        })
    }

    pub async fn update(&self, id: i64, payload: CreateGenre) -> Result<Genre> {
        payload.validate()?;
        let mut transaction = self
            .executor
            .begin()
            .await
            .map_err(Error::persistence("updating genre"))?;
        if find(id, &mut *transaction).await?.is_none() {
            return Err(Error::RecordNotFound { entity: ENTITY, id });
        }
        sqlx::query("UPDATE genres SET name = ? WHERE id = ?")
            .bind(&payload.name)
            .bind(id)
            .execute(&mut *transaction)
            .await
            .map_err(Error::persistence("updating genre"))?;
        let record = find(id, &mut *transaction)
            .await?
            .ok_or(Error::RecordNotFound { entity: ENTITY, id })?;
        transaction
            .commit()
            .await
            .map_err(Error::persistence("updating genre"))?;
        debug!(id, "Updated genre");
        Ok(record)
    }

    /// Returns the genre as it was before deletion.
    /// Movies referencing it are not touched here, storage constraints apply.
    pub async fn delete(&self, id: i64) -> Result<Genre> {
        let mut transaction = self
            .executor
            .begin()
            .await
            .map_err(Error::persistence("deleting genre"))?;
        let record = find(id, &mut *transaction)
            .await?
            .ok_or(Error::RecordNotFound { entity: ENTITY, id })?;
        sqlx::query("DELETE FROM genres WHERE id = ?")
            .bind(id)
            .execute(&mut *transaction)
            .await
            .map_err(Error::persistence("deleting genre"))?;
        transaction
            .commit()
            .await
            .map_err(Error::persistence("deleting genre"))?;
        debug!(id, "Deleted genre");
        Ok(record)
    }
}

pub(crate) async fn find<'c, E>(id: i64, executor: E) -> Result<Option<Genre>>
where
    E: Executor<'c, Database = ChosenDB>,
{
    let record = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(record)
}
