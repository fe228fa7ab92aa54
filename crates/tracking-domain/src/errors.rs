// errors.rs
use thiserror::Error;

/// Errores del modelo de seguimiento de órdenes.
///
/// Las anomalías de datos (estados desconocidos, descripciones ilegibles)
/// no son errores: se resuelven con valores por defecto en el motor de
/// timeline. Aquí sólo viven las violaciones de estructura.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl From<serde_json::Error> for DomainError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}
