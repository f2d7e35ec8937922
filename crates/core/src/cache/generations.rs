//! Generation lifecycle: open, enumerate, delete.

use std::collections::BTreeSet;

use super::connection::CacheDb;
use super::entries::StoreHandle;
use crate::Error;
use tokio_rusqlite::params;

impl CacheDb {
    /// Open the named generation, creating it if absent.
    pub async fn open_generation(&self, name: &str) -> Result<StoreHandle, Error> {
        if name.is_empty() {
            return Err(Error::InvalidInput("generation name cannot be empty".into()));
        }

        let owned = name.to_string();
        let created = self
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![owned, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)?;

        if created {
            tracing::info!(generation = name, "created cache generation");
        }

        Ok(StoreHandle::new(self.clone(), name))
    }

    /// Names of every generation opened and not yet deleted.
    pub async fn list_generations(&self) -> Result<BTreeSet<String>, Error> {
        self.conn
            .call(|conn| -> Result<BTreeSet<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<BTreeSet<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Destroy a generation and every entry in it.
    ///
    /// Returns whether the generation existed.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let owned = name.to_string();
        let deleted = self
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE generation = ?1", params![owned])?;
                let count = tx.execute("DELETE FROM generations WHERE name = ?1", params![owned])?;
                tx.commit()?;
                Ok(count)
            })
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            tracing::info!(generation = name, "deleted cache generation");
        }
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("v1").await.unwrap();
        db.open_generation("v1").await.unwrap();

        let names = db.list_generations().await.unwrap();
        assert_eq!(names.len(), 1);
        assert!(names.contains("v1"));
    }

    #[tokio::test]
    async fn test_open_empty_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(matches!(db.open_generation("").await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_generation("v1").await.unwrap();
        db.open_generation("v2").await.unwrap();

        assert!(db.delete_generation("v1").await.unwrap());
        assert!(!db.delete_generation("v1").await.unwrap());

        let names = db.list_generations().await.unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["v2".to_string()]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.list_generations().await.unwrap().is_empty());
    }
}
