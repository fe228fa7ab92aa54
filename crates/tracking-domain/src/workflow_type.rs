use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tipo de workflow de una orden. Cada tipo tiene su propio catálogo de
/// etapas y estados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowType {
  MaterialsOnly,
  MaterialsAndInstallation,
}

impl WorkflowType {
  pub const ALL: [WorkflowType; 2] = [WorkflowType::MaterialsOnly, WorkflowType::MaterialsAndInstallation];

  pub fn as_str(&self) -> &'static str {
    match self {
      WorkflowType::MaterialsOnly => "MATERIALS_ONLY",
      WorkflowType::MaterialsAndInstallation => "MATERIALS_AND_INSTALLATION",
    }
  }

  /// Interpreta un valor crudo proveniente de una orden. Los valores
  /// ausentes o desconocidos caen en el tipo por defecto.
  pub fn from_raw_or_default(raw: Option<&str>) -> Self {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
  }
}

impl fmt::Display for WorkflowType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for WorkflowType {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_uppercase().as_str() {
      "MATERIALS_ONLY" => Ok(WorkflowType::MaterialsOnly),
      "MATERIALS_AND_INSTALLATION" => Ok(WorkflowType::MaterialsAndInstallation),
      other => Err(DomainError::ValidationError(format!("Tipo de workflow inválido: {}", other))),
    }
  }
}

impl Default for WorkflowType {
  fn default() -> Self {
    WorkflowType::MaterialsOnly
  }
}
