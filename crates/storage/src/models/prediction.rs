use sqlx::FromRow;
use sqlx::types::Json;
use tournament::{PredictionKey, PredictionValue};

use crate::error::{Result, StorageError};

/// Raw `predictions` row. The value is decoded lazily so a single bad row
/// surfaces as `Corrupt` instead of failing the whole query.
#[derive(Debug, Clone, FromRow)]
pub struct PredictionRow {
    pub key: String,
    pub value: Json<serde_json::Value>,
}

impl PredictionRow {
    pub fn decode(self) -> Result<(PredictionKey, PredictionValue)> {
        let key: PredictionKey = self.key.parse().map_err(|reason| StorageError::Corrupt {
            key: self.key.clone(),
            reason,
        })?;
        let value = serde_json::from_value(self.value.0).map_err(|e| StorageError::Corrupt {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        Ok((key, value))
    }
}
