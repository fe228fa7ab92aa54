// Archivo: extraction.rs
// Propósito: extraer el estado destino de los eventos
// `workflow_status_change` y ordenar esos cambios en el tiempo.
//
// El backend históricamente sólo deja el estado destino embebido en la
// descripción ("Status changed to QUOTE_SENT"). Se conservan ambas vías: el
// patrón de texto y los campos estructurados, con la precedencia que
// indique `ExtractionPreference`.
use crate::config::ExtractionPreference;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracking_domain::OrderEvent;

static STATUS_CHANGED_TO: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"Status changed to ([A-Za-z0-9_]+)").expect("patrón de cambio de estado válido"));

/// Cambio de estado extraído de un evento.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusChange<'a> {
  /// Posición del evento en la lista de entrada.
  pub index: usize,
  pub status: String,
  pub at: DateTime<Utc>,
  pub event: &'a OrderEvent,
}

/// Estado tomado del patrón `Status changed to <ID>` de la descripción.
pub fn status_from_description(description: &str) -> Option<String> {
  STATUS_CHANGED_TO.captures(description).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Estado tomado de los campos estructurados (`new_status`, luego
/// `new_stage`).
pub fn status_from_fields(event: &OrderEvent) -> Option<String> {
  [event.new_status.as_deref(), event.new_stage.as_deref()].into_iter()
                                                             .flatten()
                                                             .map(str::trim)
                                                             .find(|s| !s.is_empty())
                                                             .map(str::to_string)
}

/// Estado destino de un evento de cambio de estado. Devuelve `None` para
/// cualquier otro tipo de evento o cuando ninguna vía produce un estado.
pub fn target_status(event: &OrderEvent, preference: ExtractionPreference) -> Option<String> {
  if !event.is_status_change() {
    return None;
  }
  match preference {
    ExtractionPreference::DescriptionFirst => {
      status_from_description(&event.description).or_else(|| status_from_fields(event))
    }
    ExtractionPreference::StructuredFirst => {
      status_from_fields(event).or_else(|| status_from_description(&event.description))
    }
  }
}

/// Cambios de estado en el orden de la lista de entrada. Los eventos sin
/// estado extraíble se omiten.
pub fn extract_status_changes(events: &[OrderEvent], preference: ExtractionPreference) -> Vec<StatusChange<'_>> {
  events.iter()
        .enumerate()
        .filter_map(|(index, event)| {
          target_status(event, preference).map(|status| StatusChange { index, status, at: event.created_at, event })
        })
        .collect()
}

/// Copia ordenada cronológicamente; empates conservan el orden de entrada.
pub fn chronological<'a>(changes: &[StatusChange<'a>]) -> Vec<StatusChange<'a>> {
  let mut sorted = changes.to_vec();
  sorted.sort_by_key(|c| c.at);
  sorted
}

/// Mapa estado -> primer cambio que llevó a él (el más temprano por
/// `created_at`; en empate, el primero visto). Las claves van en
/// mayúsculas.
pub fn status_change_map<'c, 'a>(changes: &'c [StatusChange<'a>]) -> HashMap<String, &'c StatusChange<'a>> {
  let mut map: HashMap<String, &StatusChange> = HashMap::new();
  for change in changes {
    let key = change.status.to_uppercase();
    let replace = match map.get(&key) {
      Some(existing) => change.at < existing.at,
      None => true,
    };
    if replace {
      map.insert(key, change);
    }
  }
  map
}

/// Último estado cuyo cambio ocurrió en o antes de `at`. `sorted` debe
/// venir de `chronological`.
pub fn active_status_at<'c>(sorted: &'c [StatusChange<'_>], at: DateTime<Utc>) -> Option<&'c str> {
  sorted.iter().take_while(|c| c.at <= at).last().map(|c| c.status.as_str())
}
