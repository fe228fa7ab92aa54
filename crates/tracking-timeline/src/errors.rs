// Archivo: errors.rs
// Propósito: errores del motor de timeline y alias `Result<T>`.
use thiserror::Error;

/// Errores del seguimiento de órdenes.
///
/// Las anomalías de datos nunca llegan aquí: el motor las resuelve con
/// valores por defecto. Sólo las precondiciones (datos aún no cargados) y
/// los fallos de la capa de carga se reportan como error.
#[derive(Error, Debug)]
pub enum TimelineError {
  /// Errores del modelo de dominio (validación, parseo).
  #[error("Error de dominio: {0}")]
  Domain(#[from] tracking_domain::DomainError),

  /// Falta la definición de workflow o la orden; el caller debe esperar
  /// a que estén cargadas antes de invocar el motor.
  #[error("Datos no disponibles: {0}")]
  DataNotReady(String),

  /// Error de la fuente de datos (archivo ausente, respuesta inválida).
  #[error("Error de fuente de datos: {0}")]
  Source(String),

  #[error("Error de E/S: {0}")]
  Io(#[from] std::io::Error),

  #[error("Error de serializacion: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Valor de configuración inválido.
  #[error("Error de configuración: {0}")]
  Config(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, TimelineError>;
