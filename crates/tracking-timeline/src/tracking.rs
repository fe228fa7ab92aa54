// Archivo: tracking.rs
// Propósito: vista derivada completa de una orden (timelines por etapa,
// progreso y resúmenes), lista para la capa de presentación.
use crate::config::TrackingConfig;
use crate::errors::{Result, TimelineError};
use crate::filter::EventFilter;
use crate::progress::calculate_progress;
use crate::reconciler::{StageTimelines, TimelineReconciler};
use crate::summary::{self, StageSummary};
use serde::Serialize;
use tracking_domain::{OrderEvent, OrderSnapshot, StatusDescriptor, WorkflowDefinition};

/// Resultado de una pasada de reconciliación.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderTracking {
  pub order_id: i64,
  pub progress: u8,
  pub current_status: StatusDescriptor,
  /// Etapa que contiene el estado actual; `None` se presenta como
  /// "Unknown Stage".
  pub current_stage: Option<String>,
  pub stages: Vec<StageSummary>,
  pub timelines: StageTimelines,
  pub most_recent_event_id: Option<i64>,
}

impl OrderTracking {
  /// Ejecuta el motor sobre datos ya cargados.
  pub fn compute(definition: &WorkflowDefinition,
                 order: &OrderSnapshot,
                 events: &[OrderEvent],
                 config: &TrackingConfig)
                 -> OrderTracking {
    let timelines = TimelineReconciler::with_config(definition, config).build(definition, order, events);
    let most_recent_event_id = summary::most_recent_event(&timelines).map(|e| e.event_id);
    OrderTracking { order_id: order.order_id,
                    progress: calculate_progress(order, definition.all_statuses()),
                    current_status: summary::current_status(definition, order),
                    current_stage: summary::current_stage(definition, order).map(|s| s.name.clone()),
                    stages: summary::summarize_stages(definition, order),
                    timelines,
                    most_recent_event_id }
  }

  /// Igual que `compute`, pero se niega a correr si falta la definición o
  /// la orden. Los eventos se filtran con `filter` antes de repartirlos.
  pub fn from_parts(definition: Option<&WorkflowDefinition>,
                    order: Option<&OrderSnapshot>,
                    events: &[OrderEvent],
                    filter: &EventFilter,
                    config: &TrackingConfig)
                    -> Result<OrderTracking> {
    let definition =
      definition.ok_or_else(|| TimelineError::DataNotReady("definición de workflow no cargada".to_string()))?;
    let order = order.ok_or_else(|| TimelineError::DataNotReady("orden no cargada".to_string()))?;
    if filter.is_empty() {
      return Ok(Self::compute(definition, order, events, config));
    }
    let filtered = filter.apply(events);
    Ok(Self::compute(definition, order, &filtered, config))
  }
}
