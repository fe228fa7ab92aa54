// order.rs
use crate::{DomainError, StatusId, WorkflowType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Entrada del historial de estados de una orden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
  pub status: StatusId,
  #[serde(with = "crate::timestamp")]
  pub completed_at: DateTime<Utc>,
  #[serde(default)]
  pub completed_by: Option<String>,
  #[serde(default)]
  pub notes: Option<String>,
}

/// Foto de la orden tal como la devuelve `GET /orders/{id}`.
///
/// El motor sólo la lee. `completed_statuses` no está garantizado en orden
/// de workflow: una orden puede completar estados fuera de secuencia.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
  #[serde(default)]
  pub order_id: i64,
  /// Valor crudo del tipo de workflow; ver `workflow_type()`.
  #[serde(default, alias = "type")]
  pub workflow_type: Option<String>,
  #[serde(default)]
  pub current_status: Option<StatusId>,
  #[serde(default)]
  pub workflow_status: Option<StatusId>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub completed_statuses: Vec<StatusId>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub status_history: Vec<StatusHistoryEntry>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
  where D: Deserializer<'de>,
        T: Deserialize<'de>
{
  Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl OrderSnapshot {
  pub fn new(order_id: i64) -> Self {
    Self { order_id, ..Default::default() }
  }

  /// Deserializa una orden aceptando tanto el objeto plano como el sobre
  /// `{"order": {...}}` del endpoint de detalle.
  pub fn from_json(raw: &str) -> Result<Self, DomainError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let inner = match value.get("order") {
      Some(order) if order.is_object() => order.clone(),
      _ => value,
    };
    Ok(serde_json::from_value(inner)?)
  }

  pub fn with_workflow_type(mut self, workflow_type: WorkflowType) -> Self {
    self.workflow_type = Some(workflow_type.to_string());
    self
  }

  pub fn with_current_status(mut self, status: impl Into<String>) -> Self {
    self.current_status = Some(status.into());
    self
  }

  pub fn with_workflow_status(mut self, status: impl Into<String>) -> Self {
    self.workflow_status = Some(status.into());
    self
  }

  pub fn with_completed<I, S>(mut self, statuses: I) -> Self
    where I: IntoIterator<Item = S>,
          S: Into<String>
  {
    self.completed_statuses.extend(statuses.into_iter().map(Into::into));
    self
  }

  pub fn with_history(mut self, entry: StatusHistoryEntry) -> Self {
    self.status_history.push(entry);
    self
  }

  /// Tipo de workflow efectivo; desconocido o ausente cae en el default.
  pub fn workflow_type(&self) -> WorkflowType {
    WorkflowType::from_raw_or_default(self.workflow_type.as_deref())
  }

  pub fn is_completed(&self, status_id: &str) -> bool {
    self.completed_statuses.iter().any(|s| s == status_id)
  }

  pub fn is_current(&self, status_id: &str) -> bool {
    self.current_status.as_deref() == Some(status_id)
  }

  /// Estado de workflow que se usa cuando un evento de cambio de estado no
  /// dice a qué estado llevó la orden.
  pub fn effective_workflow_status(&self) -> Option<&str> {
    self.workflow_status.as_deref().or(self.current_status.as_deref())
  }

  /// Entrada más reciente del historial para el estado indicado.
  pub fn completion_info(&self, status_id: &str) -> Option<&StatusHistoryEntry> {
    self.status_history
        .iter()
        .filter(|entry| entry.status == status_id)
        .fold(None, |latest: Option<&StatusHistoryEntry>, entry| match latest {
          Some(prev) if prev.completed_at >= entry.completed_at => Some(prev),
          _ => Some(entry),
        })
  }
}
