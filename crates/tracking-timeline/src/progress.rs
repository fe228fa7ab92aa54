// progress.rs
use tracking_domain::{OrderSnapshot, StatusDescriptor};

/// Porcentaje de estados del workflow que la orden tiene completados.
///
/// `round(100 * completados / total)` con redondeo hacia arriba en .5; `0`
/// si la lista está vacía. Siempre en `[0, 100]`.
pub fn calculate_progress<'a, I>(order: &OrderSnapshot, workflow_statuses: I) -> u8
  where I: IntoIterator<Item = &'a StatusDescriptor>
{
  let mut completed = 0usize;
  let mut total = 0usize;
  for status in workflow_statuses {
    total += 1;
    if order.is_completed(&status.id) {
      completed += 1;
    }
  }
  if total == 0 {
    return 0;
  }
  // (100 * c / t) + 0.5 en aritmética entera
  let pct = (200 * completed + total) / (2 * total);
  pct.min(100) as u8
}
