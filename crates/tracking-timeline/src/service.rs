// Archivo: service.rs
// Propósito: implementar `OrderTrackingService`, la capa que carga las
// entradas desde un `TrackingSource` y ejecuta el motor una vez que las
// tres están disponibles.
use crate::config::TrackingConfig;
use crate::errors::{Result, TimelineError};
use crate::filter::EventFilter;
use crate::source::TrackingSource;
use crate::tracking::OrderTracking;
use log::info;
use std::sync::Arc;
use tracking_domain::{OrderSnapshot, StatusDescriptor, WorkflowDefinition, WorkflowType};

/// Servicio de alto nivel sobre el seguimiento de órdenes.
///
/// Primero obtiene la orden (su tipo decide la definición) y luego pide la
/// definición y los eventos en paralelo. El motor corre de forma síncrona
/// sobre datos ya materializados; cancelar equivale a soltar el future.
pub struct OrderTrackingService<S>
  where S: TrackingSource
{
  source: Arc<S>,
  config: TrackingConfig,
}

impl<S> OrderTrackingService<S> where S: TrackingSource
{
  pub fn new(source: Arc<S>, config: TrackingConfig) -> Self {
    Self { source, config }
  }

  pub fn config(&self) -> &TrackingConfig {
    &self.config
  }

  /// Tipo de workflow de la orden; si no declara uno válido se usa el de
  /// la configuración.
  pub fn workflow_type_for(&self, order: &OrderSnapshot) -> WorkflowType {
    order.workflow_type.as_deref().and_then(|raw| raw.parse().ok()).unwrap_or(self.config.default_workflow)
  }

  async fn load_order(&self, order_id: i64) -> Result<OrderSnapshot> {
    self.source
        .fetch_order(order_id)
        .await?
        .ok_or_else(|| TimelineError::DataNotReady(format!("orden {} no disponible", order_id)))
  }

  async fn load_workflow(&self, workflow_type: WorkflowType) -> Result<WorkflowDefinition> {
    self.source
        .fetch_workflow(workflow_type)
        .await?
        .ok_or_else(|| TimelineError::DataNotReady(format!("workflow {} no disponible", workflow_type)))
  }

  /// Carga todo lo necesario y devuelve la vista derivada de la orden.
  pub async fn track(&self, order_id: i64, filter: &EventFilter) -> Result<OrderTracking> {
    let order = self.load_order(order_id).await?;
    let workflow_type = self.workflow_type_for(&order);
    let (definition, events) =
      tokio::try_join!(self.source.fetch_workflow(workflow_type), self.source.fetch_events(order_id))?;
    info!("orden {}: workflow {}, {} eventos", order_id, workflow_type, events.len());
    OrderTracking::from_parts(definition.as_ref(), Some(&order), &events, filter, &self.config)
  }

  /// Estado siguiente al actual de la orden dentro de su workflow.
  pub async fn next_status(&self, order_id: i64) -> Result<Option<StatusDescriptor>> {
    let order = self.load_order(order_id).await?;
    let definition = self.load_workflow(self.workflow_type_for(&order)).await?;
    let Some(current) = order.current_status.as_deref() else {
      return Ok(definition.all_statuses().first().map(|s| (*s).clone()));
    };
    Ok(definition.next_status_in_workflow(current).cloned())
  }
}
