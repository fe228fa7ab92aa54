// Archivo: format.rs
// Propósito: textos de presentación que la vista de timeline deriva de los
// eventos (fecha relativa, autor).
use chrono::{DateTime, Duration, Utc};
use tracking_domain::OrderEvent;

/// Fecha relativa a `now`: minutos u horas si es del mismo día, `Yesterday`,
/// días hasta una semana y luego la fecha `YYYY-MM-DD`.
pub fn format_relative(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
  let Some(at) = at else {
    return "N/A".to_string();
  };
  // relojes desfasados: una fecha futura cuenta como "ahora"
  let diff = now.signed_duration_since(at).max(Duration::zero());
  let days = diff.num_days();
  if days == 0 {
    let hours = diff.num_hours();
    if hours == 0 {
      return format!("{} minutes ago", diff.num_minutes());
    }
    return format!("{} hours ago", hours);
  }
  if days == 1 {
    return "Yesterday".to_string();
  }
  if (2..7).contains(&days) {
    return format!("{} days ago", days);
  }
  at.format("%Y-%m-%d").to_string()
}

/// Fecha y hora exacta, p. ej. `Mar 1, 2024, 10:15 AM`.
pub fn format_exact(at: Option<DateTime<Utc>>) -> String {
  match at {
    Some(at) => at.format("%b %-d, %Y, %-I:%M %p").to_string(),
    None => "N/A".to_string(),
  }
}

/// Autor de un evento: email, o los primeros 8 caracteres del id.
pub fn user_display(event: &OrderEvent) -> String {
  if let Some(email) = event.user_email.as_deref().filter(|e| !e.is_empty()) {
    return email.to_string();
  }
  match event.created_by.as_deref().filter(|c| !c.is_empty()) {
    Some(id) => format!("User {}...", id.chars().take(8).collect::<String>()),
    None => "Unknown User".to_string(),
  }
}
