use anyhow::Result;
use chrono::Local;
use sqlx::SqlitePool;

use crate::db::models::{Author, StoredReading};

/// Append/query access to the `SENSORES` table.
///
/// A thin `Clone` wrapper over the pool, shared between the ingestion task
/// (append) and the request handlers (recent). The schema is created
/// out-of-band; a missing table surfaces as an error from the first call
/// rather than being masked.
#[derive(Clone)]
pub struct ReadingStore {
    pool: SqlitePool,
}

impl ReadingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one reading as a single statement.
    ///
    /// `id` is the engine's autoincrement; `Fecha`/`Hora` are captured here,
    /// at insertion, in local time — the producer sends no timestamp.
    pub async fn append(&self, humidity: f64, distance: i64) -> Result<StoredReading> {
        let now = Local::now();
        let fecha = now.format("%Y-%m-%d").to_string();
        let hora = now.format("%H:%M:%S").to_string();

        let row = sqlx::query_as::<_, StoredReading>(
            r#"
            INSERT INTO SENSORES (Fecha, Hora, Humedad, Distancia)
            VALUES (?, ?, ?, ?)
            RETURNING ID AS id, Fecha AS fecha, Hora AS hora,
                      Humedad AS humedad, Distancia AS distancia
            "#,
        )
        .bind(&fecha)
        .bind(&hora)
        .bind(humidity)
        .bind(distance.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// The `n` most recent readings, newest first (`id` descending).
    pub async fn recent(&self, n: i64) -> Result<Vec<StoredReading>> {
        let rows = sqlx::query_as::<_, StoredReading>(
            r#"
            SELECT ID AS id, Fecha AS fecha, Hora AS hora,
                   Humedad AS humedad, Distancia AS distancia
            FROM SENSORES
            ORDER BY ID DESC
            LIMIT ?
            "#,
        )
        .bind(n)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// CRUD access to the `AUTORES` table, used only by the admin endpoints.
#[derive(Clone)]
pub struct AuthorStore {
    pool: SqlitePool,
}

impl AuthorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        nombre: &str,
        apellido: &str,
        correo: &str,
        celular: &str,
    ) -> Result<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO AUTORES (Nombre, Apellido, Correo, Celular)
            VALUES (?, ?, ?, ?)
            RETURNING ID AS id, Nombre AS nombre, Apellido AS apellido,
                      Correo AS correo, Celular AS celular
            "#,
        )
        .bind(nombre)
        .bind(apellido)
        .bind(correo)
        .bind(celular)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            r#"
            SELECT ID AS id, Nombre AS nombre, Apellido AS apellido,
                   Correo AS correo, Celular AS celular
            FROM AUTORES
            ORDER BY ID ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    async fn append_then_recent_returns_what_was_written(pool: SqlitePool) {
        let store = ReadingStore::new(pool);
        store.append(55.3, 120).await.unwrap();

        let rows = store.recent(1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].humedad, 55.3);
        assert_eq!(rows[0].distancia, "120");
        assert!(!rows[0].fecha.is_empty());
        assert!(!rows[0].hora.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn ids_are_monotonically_increasing(pool: SqlitePool) {
        let store = ReadingStore::new(pool);
        let first = store.append(40.0, 10).await.unwrap();
        let second = store.append(41.0, 20).await.unwrap();

        assert!(second.id > first.id);

        let newest = store.recent(1).await.unwrap();
        assert_eq!(newest[0].id, second.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn recent_is_bounded_and_newest_first(pool: SqlitePool) {
        let store = ReadingStore::new(pool);
        for i in 0..12i64 {
            store.append(i as f64, i * 10).await.unwrap();
        }

        let rows = store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 10);
        for pair in rows.windows(2) {
            assert!(pair[0].id > pair[1].id);
        }
        assert_eq!(rows[0].distancia, "110");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn missing_table_fails_loudly(pool: SqlitePool) {
        sqlx::query("DROP TABLE SENSORES").execute(&pool).await.unwrap();

        let store = ReadingStore::new(pool);
        assert!(store.append(1.0, 1).await.is_err());
        assert!(store.recent(10).await.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn authors_insert_and_list(pool: SqlitePool) {
        let store = AuthorStore::new(pool);
        store.insert("Isaac", "G.", "isaac@example.com", "5550000").await.unwrap();
        store.insert("Ana", "M.", "ana@example.com", "5550001").await.unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].nombre, "Isaac");
        assert_eq!(rows[1].nombre, "Ana");
        assert!(rows[1].id > rows[0].id);
    }
}
