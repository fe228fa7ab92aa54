// stage.rs
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Etapa gruesa del pipeline por la que avanza una orden.
///
/// Las cinco primeras forman el orden lineal del pipeline (adquisición <
/// cotización < compras < entrega < cierre). `Cancelled` y `OnHold` son
/// etapas fuera de banda y no participan de ese orden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
  LeadAcquisition,
  Quotation,
  Procurement,
  Fulfillment,
  Finalization,
  Cancelled,
  OnHold,
}

impl Stage {
  /// Etapas del pipeline en su orden lineal.
  pub const LINEAR: [Stage; 5] =
    [Stage::LeadAcquisition, Stage::Quotation, Stage::Procurement, Stage::Fulfillment, Stage::Finalization];

  /// Todas las etapas en el orden en que se consultan al clasificar.
  pub const ALL: [Stage; 7] = [Stage::LeadAcquisition,
                               Stage::Quotation,
                               Stage::Procurement,
                               Stage::Fulfillment,
                               Stage::Finalization,
                               Stage::Cancelled,
                               Stage::OnHold];

  /// Posición dentro del orden lineal; `None` para las etapas fuera de banda.
  pub fn linear_position(&self) -> Option<usize> {
    Self::LINEAR.iter().position(|s| s == self)
  }

  pub fn is_out_of_band(&self) -> bool {
    self.linear_position().is_none()
  }

  /// Identificador tal como lo emite el backend.
  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::LeadAcquisition => "LEAD_ACQUISITION",
      Stage::Quotation => "QUOTATION",
      Stage::Procurement => "PROCUREMENT",
      Stage::Fulfillment => "FULFILLMENT",
      Stage::Finalization => "FINALIZATION",
      Stage::Cancelled => "CANCELLED",
      Stage::OnHold => "ON_HOLD",
    }
  }

  /// Nombre legible por defecto de la etapa.
  pub fn display_name(&self) -> &'static str {
    match self {
      Stage::LeadAcquisition => "Lead Acquisition",
      Stage::Quotation => "Quotation",
      Stage::Procurement => "Procurement",
      Stage::Fulfillment => "Fulfillment",
      Stage::Finalization => "Finalization",
      Stage::Cancelled => "Cancelled",
      Stage::OnHold => "On Hold",
    }
  }
}

impl Default for Stage {
  fn default() -> Self {
    Stage::LeadAcquisition
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Stage {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_uppercase();
    Stage::ALL.iter()
              .copied()
              .find(|stage| stage.as_str() == normalized)
              .ok_or_else(|| DomainError::ValidationError(format!("Etapa desconocida: {}", s)))
  }
}
