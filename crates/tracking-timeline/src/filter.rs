// filter.rs
use tracking_domain::OrderEvent;

/// Búsqueda de texto sobre eventos, sin distinguir mayúsculas.
///
/// Compara contra descripción, tipo de evento, etapa previa/nueva y email
/// del autor. Un término en blanco no filtra nada.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
  term: String,
}

impl EventFilter {
  pub fn new(term: impl Into<String>) -> Self {
    Self { term: term.into().trim().to_lowercase() }
  }

  pub fn is_empty(&self) -> bool {
    self.term.is_empty()
  }

  pub fn matches(&self, event: &OrderEvent) -> bool {
    if self.is_empty() {
      return true;
    }
    let term = self.term.as_str();
    let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(term));
    hit(Some(event.description.as_str()))
    || hit(Some(event.event_type.as_str()))
    || hit(event.previous_stage.as_deref())
    || hit(event.new_stage.as_deref())
    || hit(event.user_email.as_deref())
  }

  pub fn apply(&self, events: &[OrderEvent]) -> Vec<OrderEvent> {
    events.iter().filter(|e| self.matches(e)).cloned().collect()
  }
}
