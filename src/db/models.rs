use serde::Serialize;
use sqlx::FromRow;

/// One row of the `SENSORES` table.
///
/// `id`, `fecha` and `hora` are assigned by the store at insertion time; the
/// producer's payload carries neither identity nor a timestamp. `distancia`
/// is TEXT in the fixed schema even though the reading is numeric in memory —
/// the writer stringifies on insert.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredReading {
    pub id: i64,
    /// `%Y-%m-%d`, local time at insertion.
    pub fecha: String,
    /// `%H:%M:%S`, local time at insertion.
    pub hora: String,
    pub humedad: f64,
    pub distancia: String,
}

/// One row of the `AUTORES` table — a registrable contact record.
/// Shares the store with the readings but is never touched by ingestion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Author {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    pub correo: String,
    pub celular: String,
}
