// Archivo: config.rs
// Propósito: configuración del seguimiento de órdenes. Se lee de variables
// de entorno (con soporte para `.env` vía dotenvy) y tiene valores por
// defecto razonables para pruebas.
use crate::errors::{Result, TimelineError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracking_domain::WorkflowType;

pub const ENV_DATA_DIR: &str = "ORDER_TRACKING_DATA_DIR";
pub const ENV_DEFAULT_WORKFLOW: &str = "ORDER_TRACKING_DEFAULT_WORKFLOW";
pub const ENV_EXTRACTION: &str = "ORDER_TRACKING_EXTRACTION";
pub const ENV_FALLBACK_STATUS: &str = "ORDER_TRACKING_FALLBACK_STATUS";

/// Estado que se asume cuando ningún cambio de estado precede a un evento.
pub const DEFAULT_FALLBACK_STATUS: &str = "NEW_LEAD";

/// De dónde se toma el estado destino de un `workflow_status_change`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPreference {
  /// Primero el patrón `Status changed to <ID>` de la descripción, luego los
  /// campos estructurados (`new_status`, `new_stage`).
  DescriptionFirst,
  /// Primero los campos estructurados, luego la descripción.
  StructuredFirst,
}

impl Default for ExtractionPreference {
  fn default() -> Self {
    ExtractionPreference::DescriptionFirst
  }
}

impl FromStr for ExtractionPreference {
  type Err = TimelineError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "description_first" | "description" => Ok(ExtractionPreference::DescriptionFirst),
      "structured_first" | "structured" => Ok(ExtractionPreference::StructuredFirst),
      other => Err(TimelineError::Config(format!("{} inválido: {}", ENV_EXTRACTION, other))),
    }
  }
}

/// Configuración del motor y de la capa de carga.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
  /// Directorio raíz de la fuente JSON (`orders/`, `order-events/`,
  /// `workflows/`).
  pub data_dir: PathBuf,
  /// Tipo de workflow para órdenes que no declaran uno válido.
  pub default_workflow: WorkflowType,
  pub extraction: ExtractionPreference,
  pub fallback_status: String,
}

impl Default for TrackingConfig {
  fn default() -> Self {
    TrackingConfig { data_dir: PathBuf::from("./data"),
                     default_workflow: WorkflowType::default(),
                     extraction: ExtractionPreference::default(),
                     fallback_status: DEFAULT_FALLBACK_STATUS.to_string() }
  }
}

impl TrackingConfig {
  /// Carga `.env` si existe y lee la configuración del entorno.
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    Self::from_vars(|key| std::env::var(key).ok())
  }

  /// Construye la configuración a partir de una función de búsqueda de
  /// variables. Las ausentes o vacías toman el valor por defecto.
  pub fn from_vars<F>(lookup: F) -> Result<Self>
    where F: Fn(&str) -> Option<String>
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut cfg = TrackingConfig::default();
    if let Some(dir) = get(ENV_DATA_DIR) {
      cfg.data_dir = PathBuf::from(dir);
    }
    if let Some(wt) = get(ENV_DEFAULT_WORKFLOW) {
      cfg.default_workflow = wt.parse()
                               .map_err(|e| TimelineError::Config(format!("{}: {}", ENV_DEFAULT_WORKFLOW, e)))?;
    }
    if let Some(pref) = get(ENV_EXTRACTION) {
      cfg.extraction = pref.parse()?;
    }
    if let Some(status) = get(ENV_FALLBACK_STATUS) {
      cfg.fallback_status = status.to_uppercase();
    }
    Ok(cfg)
  }

  pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.data_dir = dir.into();
    self
  }

  pub fn with_extraction(mut self, extraction: ExtractionPreference) -> Self {
    self.extraction = extraction;
    self
  }
}
