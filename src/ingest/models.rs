use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Wire payload
//
// The simulator publishes a JSON object with up to two keys:
//
//   { "Humedad": 55.3, "Distancia": 120 }
//
// Both keys are optional; some producers send `Distancia` as a numeric
// string ("120") instead of a number. Anything that is not an object with
// this shape is a decode failure and the message is dropped.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SensorPayload {
    #[serde(rename = "Humedad")]
    pub humedad: Option<f64>,
    #[serde(rename = "Distancia")]
    pub distancia: Option<DistanceValue>,
}

/// `Distancia` is polymorphic on the wire. `#[serde(untagged)]` tries the
/// variants in order; Integer must come before Float so whole numbers keep
/// their integer representation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DistanceValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl DistanceValue {
    /// Coerce to the canonical numeric representation.
    fn into_i64(self) -> Result<i64, DecodeError> {
        match self {
            DistanceValue::Integer(v) => Ok(v),
            DistanceValue::Float(v) => Ok(v as i64),
            DistanceValue::Text(s) => {
                s.trim().parse().map_err(|_| DecodeError::BadDistance(s))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not a valid sensor JSON object: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Distancia is not numeric: {0:?}")]
    BadDistance(String),
}

/// A decoded reading in canonical types: humidity as a float percentage,
/// distance as an integer. Missing wire fields default to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub humidity: f64,
    pub distance: i64,
}

impl Reading {
    /// Decode a raw MQTT payload. This is the only place the wire's typing
    /// ambiguity is resolved; everything downstream sees `f64`/`i64`.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let wire: SensorPayload = serde_json::from_slice(payload)?;
        Ok(Self {
            humidity: wire.humedad.unwrap_or(0.0),
            distance: wire
                .distancia
                .map(DistanceValue::into_i64)
                .transpose()?
                .unwrap_or(0),
        })
    }
}
