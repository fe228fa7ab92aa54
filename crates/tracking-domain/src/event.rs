// Archivo: event.rs
// Propósito: eventos de auditoría de una orden (`GET /order-events/{id}`).
// Son inmutables y de sólo lectura para el motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Tipo de evento. El backend lo envía como texto libre; aquí se cierra en
/// una unión etiquetada con `Other` como brazo explícito para tipos nuevos.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
  OrderCreation,
  WorkflowStatusChange,
  StageChange,
  StageCompletion,
  StageTransition,
  Note,
  Creation,
  Update,
  Document,
  Payment,
  StatusChange,
  Other(String),
}

impl EventType {
  pub fn as_str(&self) -> &str {
    match self {
      EventType::OrderCreation => "order_creation",
      EventType::WorkflowStatusChange => "workflow_status_change",
      EventType::StageChange => "stage_change",
      EventType::StageCompletion => "stage_completion",
      EventType::StageTransition => "stage_transition",
      EventType::Note => "note",
      EventType::Creation => "creation",
      EventType::Update => "update",
      EventType::Document => "document",
      EventType::Payment => "payment",
      EventType::StatusChange => "status_change",
      EventType::Other(raw) => raw.as_str(),
    }
  }

  /// Etiqueta legible para la vista de timeline.
  pub fn label(&self) -> &'static str {
    match self {
      EventType::OrderCreation => "Order Created",
      EventType::WorkflowStatusChange => "Status Change",
      EventType::StageChange => "Stage Change",
      EventType::StageCompletion => "Stage Complete",
      EventType::StageTransition => "Stage Transition",
      EventType::Note => "Note",
      EventType::Creation => "Created",
      EventType::Update => "Updated",
      EventType::Document => "Document",
      EventType::Payment => "Payment",
      EventType::StatusChange => "Status Change",
      EventType::Other(_) => "Event",
    }
  }
}

impl From<String> for EventType {
  fn from(raw: String) -> Self {
    match raw.as_str() {
      "order_creation" => EventType::OrderCreation,
      "workflow_status_change" => EventType::WorkflowStatusChange,
      "stage_change" => EventType::StageChange,
      "stage_completion" => EventType::StageCompletion,
      "stage_transition" => EventType::StageTransition,
      "note" => EventType::Note,
      "creation" => EventType::Creation,
      "update" => EventType::Update,
      "document" => EventType::Document,
      "payment" => EventType::Payment,
      "status_change" => EventType::StatusChange,
      _ => EventType::Other(raw),
    }
  }
}

impl From<&str> for EventType {
  fn from(raw: &str) -> Self {
    EventType::from(raw.to_string())
  }
}

impl From<EventType> for String {
  fn from(value: EventType) -> Self {
    value.as_str().to_string()
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Evento de auditoría de una orden.
///
/// `new_stage`/`previous_stage` históricamente transportan ids de estado,
/// no de etapa. `new_status` es el campo estructurado que reemplaza el
/// parseo de la descripción cuando el backend lo envía.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
  pub event_id: i64,
  #[serde(default)]
  pub order_id: Option<i64>,
  pub event_type: EventType,
  #[serde(default)]
  pub description: String,
  #[serde(with = "crate::timestamp")]
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub created_by: Option<String>,
  #[serde(default)]
  pub user_email: Option<String>,
  #[serde(default)]
  pub new_stage: Option<String>,
  #[serde(default)]
  pub previous_stage: Option<String>,
  #[serde(default)]
  pub new_status: Option<String>,
  #[serde(default)]
  pub metadata: Option<JsonValue>,
}

impl OrderEvent {
  pub fn new(event_id: i64,
             event_type: impl Into<EventType>,
             description: impl Into<String>,
             created_at: DateTime<Utc>)
             -> Self {
    Self { event_id,
           order_id: None,
           event_type: event_type.into(),
           description: description.into(),
           created_at,
           created_by: None,
           user_email: None,
           new_stage: None,
           previous_stage: None,
           new_status: None,
           metadata: None }
  }

  pub fn with_new_stage(mut self, new_stage: impl Into<String>) -> Self {
    self.new_stage = Some(new_stage.into());
    self
  }

  pub fn with_previous_stage(mut self, previous_stage: impl Into<String>) -> Self {
    self.previous_stage = Some(previous_stage.into());
    self
  }

  pub fn with_new_status(mut self, new_status: impl Into<String>) -> Self {
    self.new_status = Some(new_status.into());
    self
  }

  pub fn with_author(mut self, created_by: impl Into<String>, user_email: Option<String>) -> Self {
    self.created_by = Some(created_by.into());
    self.user_email = user_email;
    self
  }

  pub fn is_status_change(&self) -> bool {
    self.event_type == EventType::WorkflowStatusChange
  }
}
