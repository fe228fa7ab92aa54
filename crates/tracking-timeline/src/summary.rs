// Archivo: summary.rs
// Propósito: resúmenes derivados de la orden para la cabecera de la vista:
// estado de cada etapa, estado/etapa actual y evento más reciente.
use crate::reconciler::StageTimelines;
use serde::Serialize;
use tracking_domain::{OrderEvent, OrderSnapshot, Stage, StageDescriptor, StatusDescriptor, WorkflowDefinition};

pub const NOT_STARTED_ID: &str = "NOT_STARTED";
pub const NOT_STARTED_NAME: &str = "Not Started";

/// Situación de una etapa respecto de la orden.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
  /// Todos sus estados están completados (y tiene al menos uno).
  Completed,
  /// Contiene el estado actual de la orden.
  Current,
  /// Tiene algún estado completado.
  InProgress,
  Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageSummary {
  pub stage: Stage,
  pub name: String,
  pub state: StageState,
  pub completed_count: usize,
  pub total: usize,
}

pub fn stage_state(stage: &StageDescriptor, order: &OrderSnapshot) -> StageState {
  let completed = stage.statuses.iter().filter(|s| order.is_completed(&s.id)).count();
  if !stage.statuses.is_empty() && completed == stage.statuses.len() {
    StageState::Completed
  } else if stage.statuses.iter().any(|s| order.is_current(&s.id)) {
    StageState::Current
  } else if completed > 0 {
    StageState::InProgress
  } else {
    StageState::Pending
  }
}

/// Resumen por etapa en el orden de la definición.
pub fn summarize_stages(definition: &WorkflowDefinition, order: &OrderSnapshot) -> Vec<StageSummary> {
  definition.stages
            .iter()
            .map(|stage| StageSummary { stage: stage.id,
                                        name: stage.name.clone(),
                                        state: stage_state(stage, order),
                                        completed_count: stage.statuses
                                                              .iter()
                                                              .filter(|s| order.is_completed(&s.id))
                                                              .count(),
                                        total: stage.statuses.len() })
            .collect()
}

/// Descriptor del estado actual; `NOT_STARTED` si la orden no tiene estado
/// o el estado no está en la definición.
pub fn current_status(definition: &WorkflowDefinition, order: &OrderSnapshot) -> StatusDescriptor {
  order.current_status
       .as_deref()
       .and_then(|id| definition.find_status(id))
       .cloned()
       .unwrap_or_else(|| StatusDescriptor::new(NOT_STARTED_ID, NOT_STARTED_NAME))
}

/// Etapa de la definición que contiene el estado actual.
pub fn current_stage<'d>(definition: &'d WorkflowDefinition, order: &OrderSnapshot) -> Option<&'d StageDescriptor> {
  order.current_status.as_deref().and_then(|id| definition.stage_for_status(id))
}

/// Evento más reciente entre todas las etapas; en empate gana el primero
/// recorrido.
pub fn most_recent_event(timelines: &StageTimelines) -> Option<&OrderEvent> {
  let mut latest: Option<&OrderEvent> = None;
  for event in timelines.values().flat_map(|t| t.events.iter()) {
    if latest.map_or(true, |l| event.created_at > l.created_at) {
      latest = Some(event);
    }
  }
  latest
}
