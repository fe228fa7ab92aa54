// Archivo: reconciler.rs
// Propósito: construir, por etapa, la línea de tiempo que mezcla los
// estados del workflow (completados, actual y futuros) con los eventos de
// auditoría de la orden.
//
// Es una transformación pura: recibe la definición, la orden y los eventos
// ya materializados y devuelve una estructura nueva en cada llamada. No hay
// parcheo incremental; recalcular es la única forma de actualizar.
use crate::classifier::StageClassifier;
use crate::config::{ExtractionPreference, TrackingConfig, DEFAULT_FALLBACK_STATUS};
use crate::extraction::{self, StatusChange};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracking_domain::{
  EventType, OrderEvent, OrderSnapshot, Stage, StageDescriptor, StatusDescriptor, StatusHistoryEntry,
  WorkflowDefinition,
};

/// Punto de control de un estado dentro de la línea de tiempo.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusItem {
  pub status: StatusDescriptor,
  /// `created_at` del primer cambio de estado que llevó a este estado.
  pub timestamp: Option<DateTime<Utc>>,
  pub is_completed: bool,
  pub is_current: bool,
  /// Ni completado, ni actual, ni alcanzado por un cambio de estado.
  pub is_future: bool,
  /// Entrada más reciente del historial de la orden para el estado.
  pub completion: Option<StatusHistoryEntry>,
  /// Evento de cambio de estado que fija `timestamp`.
  pub status_change_event_id: Option<i64>,
}

impl StatusItem {
  /// Completado o actual.
  pub fn is_reached(&self) -> bool {
    self.is_completed || self.is_current
  }
}

/// Fila de la línea de tiempo.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineItem {
  Status(StatusItem),
  Event(OrderEvent),
}

impl TimelineItem {
  pub fn timestamp(&self) -> Option<DateTime<Utc>> {
    match self {
      TimelineItem::Status(item) => item.timestamp,
      TimelineItem::Event(event) => Some(event.created_at),
    }
  }

  pub fn as_status(&self) -> Option<&StatusItem> {
    match self {
      TimelineItem::Status(item) => Some(item),
      TimelineItem::Event(_) => None,
    }
  }

  pub fn as_event(&self) -> Option<&OrderEvent> {
    match self {
      TimelineItem::Event(event) => Some(event),
      TimelineItem::Status(_) => None,
    }
  }
}

/// Línea de tiempo de una etapa.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageTimeline {
  pub stage: Stage,
  pub name: String,
  /// Todos los eventos asignados a la etapa, en el orden de entrada,
  /// incluidos los cambios de estado que anclan un `StatusItem`.
  pub events: Vec<OrderEvent>,
  /// Estados y eventos no ancla, ya mezclados y ordenados.
  pub items: Vec<TimelineItem>,
}

impl StageTimeline {
  pub fn status_items(&self) -> impl Iterator<Item = &StatusItem> {
    self.items.iter().filter_map(TimelineItem::as_status)
  }

  pub fn event_items(&self) -> impl Iterator<Item = &OrderEvent> {
    self.items.iter().filter_map(TimelineItem::as_event)
  }
}

/// Líneas de tiempo por etapa, en el orden de la definición.
pub type StageTimelines = IndexMap<Stage, StageTimeline>;

/// Motor de reconciliación configurado para una definición.
#[derive(Clone, Debug)]
pub struct TimelineReconciler {
  classifier: StageClassifier,
  extraction: ExtractionPreference,
  fallback_status: String,
}

impl TimelineReconciler {
  /// Reconciliador con la tabla de la definición y los valores por defecto.
  pub fn new(definition: &WorkflowDefinition) -> Self {
    Self::with_classifier(StageClassifier::for_workflow(definition),
                          ExtractionPreference::default(),
                          DEFAULT_FALLBACK_STATUS)
  }

  pub fn with_config(definition: &WorkflowDefinition, config: &TrackingConfig) -> Self {
    Self::with_classifier(StageClassifier::for_workflow(definition),
                          config.extraction,
                          config.fallback_status.clone())
  }

  pub fn with_classifier(classifier: StageClassifier,
                         extraction: ExtractionPreference,
                         fallback_status: impl Into<String>)
                         -> Self {
    Self { classifier, extraction, fallback_status: fallback_status.into() }
  }

  /// Etapa a la que pertenece un evento.
  ///
  /// Precedencia: creación de orden -> adquisición; cambio de estado -> su
  /// estado destino (o el estado de workflow de la orden); cambio de etapa
  /// con `new_stage` -> ese valor; cualquier otro -> el último estado cuyo
  /// cambio precede al evento. Si la etapa resultante no existe en la
  /// definición se usa la primera etapa de la definición.
  pub fn assign_stage(&self,
                      definition: &WorkflowDefinition,
                      order: &OrderSnapshot,
                      event: &OrderEvent,
                      sorted_changes: &[StatusChange<'_>])
                      -> Stage {
    let stage = match &event.event_type {
      EventType::OrderCreation => Stage::LeadAcquisition,
      EventType::WorkflowStatusChange => match extraction::target_status(event, self.extraction) {
        Some(status) => self.classifier.classify(&status),
        None => {
          let status = order.effective_workflow_status().unwrap_or(&self.fallback_status);
          debug!("evento {} sin estado destino, se usa el estado de la orden {}", event.event_id, status);
          self.classifier.classify(status)
        }
      },
      EventType::StageChange if event.new_stage.is_some() => {
        self.classifier.classify(event.new_stage.as_deref().unwrap_or_default())
      }
      _ => {
        let status = extraction::active_status_at(sorted_changes, event.created_at).unwrap_or(&self.fallback_status);
        self.classifier.classify(status)
      }
    };
    if definition.has_stage(stage) {
      return stage;
    }
    let fallback = definition.first_stage().map(|s| s.id).unwrap_or_default();
    debug!("etapa {} ausente en la definición para el evento {}, se usa {}", stage, event.event_id, fallback);
    fallback
  }

  /// Reparte cada evento en exactamente una etapa de la definición. Cada
  /// cubeta conserva el orden de entrada y guarda la posición original del
  /// evento.
  fn bucket_events<'e>(&self,
                       definition: &WorkflowDefinition,
                       order: &OrderSnapshot,
                       events: &'e [OrderEvent],
                       sorted_changes: &[StatusChange<'_>])
                       -> IndexMap<Stage, Vec<(usize, &'e OrderEvent)>> {
    let mut buckets: IndexMap<Stage, Vec<(usize, &OrderEvent)>> =
      definition.stages.iter().map(|s| (s.id, Vec::new())).collect();
    for (index, event) in events.iter().enumerate() {
      let stage = self.assign_stage(definition, order, event, sorted_changes);
      if let Some(bucket) = buckets.get_mut(&stage) {
        bucket.push((index, event));
      }
    }
    buckets
  }

  /// Construye la línea de tiempo de cada etapa de la definición.
  pub fn build(&self, definition: &WorkflowDefinition, order: &OrderSnapshot, events: &[OrderEvent]) -> StageTimelines {
    let changes = extraction::extract_status_changes(events, self.extraction);
    let sorted_changes = extraction::chronological(&changes);
    let change_map = extraction::status_change_map(&changes);
    let buckets = self.bucket_events(definition, order, events, &sorted_changes);

    // Anclas: cambios de estado que fijan el timestamp de un estado de la
    // definición. No se repiten como filas de evento.
    let anchors: HashSet<usize> =
      change_map.iter()
                .filter(|(status, _)| definition.all_statuses().iter().any(|s| s.id.to_uppercase() == **status))
                .map(|(_, change)| change.index)
                .collect();

    let mut timelines = StageTimelines::new();
    for (stage, bucket) in buckets {
      let Some(descriptor) = definition.stage(stage) else { continue };
      let status_items = status_items_for(descriptor, order, &change_map);
      let loose_events: Vec<OrderEvent> =
        bucket.iter().filter(|(index, _)| !anchors.contains(index)).map(|(_, event)| (*event).clone()).collect();
      let items = merge_stage_items(status_items, loose_events);
      timelines.insert(stage,
                       StageTimeline { stage,
                                       name: descriptor.name.clone(),
                                       events: bucket.into_iter().map(|(_, event)| event.clone()).collect(),
                                       items });
    }
    timelines
  }
}

/// Atajo: reconciliación con la tabla de la definición y los valores por
/// defecto.
pub fn build_stage_timelines(definition: &WorkflowDefinition,
                             order: &OrderSnapshot,
                             events: &[OrderEvent])
                             -> StageTimelines {
  TimelineReconciler::new(definition).build(definition, order, events)
}

fn status_items_for(descriptor: &StageDescriptor,
                    order: &OrderSnapshot,
                    change_map: &HashMap<String, &StatusChange<'_>>)
                    -> Vec<StatusItem> {
  descriptor.statuses
            .iter()
            .map(|status| {
              let is_completed = order.is_completed(&status.id);
              let is_current = order.is_current(&status.id);
              let change = change_map.get(&status.id.to_uppercase());
              let timestamp = change.map(|c| c.at);
              StatusItem { status: status.clone(),
                           timestamp,
                           is_completed,
                           is_current,
                           is_future: timestamp.is_none() && !is_current && !is_completed,
                           completion: order.completion_info(&status.id).cloned(),
                           status_change_event_id: change.map(|c| c.event.event_id) }
            })
            .collect()
}

struct Entry {
  item: TimelineItem,
  /// Posición en la etapa para filas de estado con timestamp.
  anchor_pos: Option<usize>,
}

/// Mezcla los estados de una etapa (en orden de workflow) con sus eventos
/// no ancla (en orden de cubeta).
///
/// - Filas con timestamp: orden cronológico estable (primero estados,
///   luego eventos, como en la entrada).
/// - Estados alcanzados sin timestamp: conservan su lugar en el workflow,
///   justo antes del primer estado posterior con timestamp; al final de las
///   filas con timestamp si no hay ninguno.
/// - Estados futuros: al final, en orden de workflow.
pub(crate) fn merge_stage_items(status_items: Vec<StatusItem>, events: Vec<OrderEvent>) -> Vec<TimelineItem> {
  let mut timed: Vec<Entry> = Vec::new();
  let mut reached: Vec<(usize, StatusItem)> = Vec::new();
  let mut future: Vec<StatusItem> = Vec::new();

  for (pos, item) in status_items.into_iter().enumerate() {
    if item.timestamp.is_some() {
      timed.push(Entry { item: TimelineItem::Status(item), anchor_pos: Some(pos) });
    } else if item.is_reached() {
      reached.push((pos, item));
    } else {
      future.push(item);
    }
  }
  timed.extend(events.into_iter().map(|event| Entry { item: TimelineItem::Event(event), anchor_pos: None }));
  timed.sort_by_key(|entry| entry.item.timestamp());

  for (pos, item) in reached {
    let at = timed.iter().position(|entry| entry.anchor_pos.is_some_and(|anchor| anchor > pos)).unwrap_or(timed.len());
    timed.insert(at, Entry { item: TimelineItem::Status(item), anchor_pos: None });
  }

  timed.into_iter()
       .map(|entry| entry.item)
       .chain(future.into_iter().map(TimelineItem::Status))
       .collect()
}
