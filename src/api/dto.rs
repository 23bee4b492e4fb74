use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::{Author, StoredReading},
    live_state::LiveState,
};

/// Live snapshot as polled by the dashboard every couple of seconds.
/// Field names and casing are part of the wire contract.
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveStateDto {
    #[serde(rename = "Humedad")]
    pub humedad: f64,
    #[serde(rename = "Distancia")]
    pub distancia: i64,
    /// Broker connection status: `Desconectado`, `Conectado` or `Error`.
    pub mqtt: String,
    /// `%H:%M:%S` of the last processed message, or a placeholder before
    /// the first one arrives.
    pub ultimo_mensaje: String,
}

impl From<LiveState> for LiveStateDto {
    fn from(s: LiveState) -> Self {
        Self {
            humedad: s.humidity,
            distancia: s.distance,
            mqtt: s.connection.to_string(),
            ultimo_mensaje: s
                .last_update
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "Esperando datos...".to_owned()),
        }
    }
}

/// One `SENSORES` row in the history listing, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryRowDto {
    pub id: i64,
    pub fecha: String,
    pub hora: String,
    pub humedad: f64,
    /// Exposed as stored — the fixed schema keeps distance as text.
    pub distancia: String,
}

impl From<StoredReading> for HistoryRowDto {
    fn from(r: StoredReading) -> Self {
        Self {
            id: r.id,
            fecha: r.fecha,
            hora: r.hora,
            humedad: r.humedad,
            distancia: r.distancia,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorDto {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    pub correo: String,
    pub celular: String,
}

impl From<Author> for AuthorDto {
    fn from(a: Author) -> Self {
        Self {
            id: a.id,
            nombre: a.nombre,
            apellido: a.apellido,
            correo: a.correo,
            celular: a.celular,
        }
    }
}

/// Request body for `POST /api/autores`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewAuthor {
    pub nombre: String,
    pub apellido: String,
    pub correo: String,
    pub celular: String,
}
