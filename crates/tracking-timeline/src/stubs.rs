// Archivo: stubs.rs
// Propósito: fuente de datos en memoria para pruebas y wiring rápido. No es
// durable.
use crate::errors::Result;
use crate::source::TrackingSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracking_domain::{OrderEvent, OrderSnapshot, WorkflowDefinition, WorkflowType};

/// Fuente en memoria. Sin definición registrada para un tipo, devuelve la
/// del catálogo embebido.
#[derive(Debug, Default)]
pub struct InMemoryTrackingSource {
  orders: Mutex<HashMap<i64, OrderSnapshot>>,
  events: Mutex<HashMap<i64, Vec<OrderEvent>>>,
  workflows: Mutex<HashMap<WorkflowType, WorkflowDefinition>>,
}

impl InMemoryTrackingSource {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registra (o reemplaza) una orden.
  pub fn put_order(&self, order: OrderSnapshot) {
    self.orders.lock().unwrap_or_else(|e| e.into_inner()).insert(order.order_id, order);
  }

  /// Agrega un evento al final del log de la orden.
  pub fn push_event(&self, order_id: i64, event: OrderEvent) {
    self.events.lock().unwrap_or_else(|e| e.into_inner()).entry(order_id).or_default().push(event);
  }

  /// Registra una definición propia para un tipo de workflow.
  pub fn put_workflow(&self, workflow_type: WorkflowType, definition: WorkflowDefinition) {
    self.workflows.lock().unwrap_or_else(|e| e.into_inner()).insert(workflow_type, definition);
  }
}

#[async_trait]
impl TrackingSource for InMemoryTrackingSource {
  async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderSnapshot>> {
    Ok(self.orders.lock().unwrap_or_else(|e| e.into_inner()).get(&order_id).cloned())
  }

  async fn fetch_workflow(&self, workflow_type: WorkflowType) -> Result<Option<WorkflowDefinition>> {
    let registered = self.workflows.lock().unwrap_or_else(|e| e.into_inner()).get(&workflow_type).cloned();
    Ok(Some(registered.unwrap_or_else(|| WorkflowDefinition::builtin(workflow_type).clone())))
  }

  async fn fetch_events(&self, order_id: i64) -> Result<Vec<OrderEvent>> {
    Ok(self.events.lock().unwrap_or_else(|e| e.into_inner()).get(&order_id).cloned().unwrap_or_default())
  }
}
