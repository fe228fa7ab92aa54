// Archivo: source.rs
// Propósito: definir el contrato `TrackingSource` para obtener las tres
// entradas del motor (orden, definición de workflow, eventos) y una
// implementación que lee un directorio de archivos JSON.
use crate::errors::{Result, TimelineError};
use async_trait::async_trait;
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracking_domain::{OrderEvent, OrderSnapshot, WorkflowDefinition, WorkflowType};

/// Contrato mínimo de la fuente de datos del seguimiento.
///
/// Refleja los endpoints del backend: `GET /orders/{id}`,
/// `GET /workflow/full-workflow/{type}` y `GET /order-events/{id}`. Los
/// datos ausentes se devuelven como `None`/lista vacía; los errores quedan
/// para fallos reales de lectura o formato.
#[async_trait]
pub trait TrackingSource: Send + Sync {
  /// Obtiene la foto de la orden.
  async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderSnapshot>>;

  /// Obtiene la definición de workflow del tipo indicado.
  async fn fetch_workflow(&self, workflow_type: WorkflowType) -> Result<Option<WorkflowDefinition>>;

  /// Obtiene los eventos de auditoría de la orden.
  async fn fetch_events(&self, order_id: i64) -> Result<Vec<OrderEvent>>;
}

/// Fuente respaldada por un directorio:
///
/// ```text
/// <root>/orders/<id>.json          orden (plana o {"order": {...}})
/// <root>/order-events/<id>.json    lista de eventos
/// <root>/workflows/<TYPE>.json     definición (opcional)
/// ```
///
/// Sin archivo de definición se usa el catálogo embebido.
#[derive(Clone, Debug)]
pub struct JsonDirectorySource {
  root: PathBuf,
}

impl JsonDirectorySource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn order_path(&self, order_id: i64) -> PathBuf {
    self.root.join("orders").join(format!("{}.json", order_id))
  }

  fn events_path(&self, order_id: i64) -> PathBuf {
    self.root.join("order-events").join(format!("{}.json", order_id))
  }

  fn workflow_path(&self, workflow_type: WorkflowType) -> PathBuf {
    self.root.join("workflows").join(format!("{}.json", workflow_type))
  }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
  match tokio::fs::read_to_string(path).await {
    Ok(raw) => Ok(Some(raw)),
    Err(e) if e.kind() == ErrorKind::NotFound => {
      debug!("archivo ausente: {}", path.display());
      Ok(None)
    }
    Err(e) => Err(TimelineError::Io(e)),
  }
}

#[async_trait]
impl TrackingSource for JsonDirectorySource {
  async fn fetch_order(&self, order_id: i64) -> Result<Option<OrderSnapshot>> {
    let path = self.order_path(order_id);
    match read_optional(&path).await? {
      Some(raw) => {
        let order = OrderSnapshot::from_json(&raw)
          .map_err(|e| TimelineError::Source(format!("{}: {}", path.display(), e)))?;
        Ok(Some(order))
      }
      None => Ok(None),
    }
  }

  async fn fetch_workflow(&self, workflow_type: WorkflowType) -> Result<Option<WorkflowDefinition>> {
    let path = self.workflow_path(workflow_type);
    match read_optional(&path).await? {
      Some(raw) => {
        let def = WorkflowDefinition::from_json(&raw)
          .map_err(|e| TimelineError::Source(format!("{}: {}", path.display(), e)))?;
        Ok(Some(def))
      }
      None => Ok(Some(WorkflowDefinition::builtin(workflow_type).clone())),
    }
  }

  async fn fetch_events(&self, order_id: i64) -> Result<Vec<OrderEvent>> {
    let path = self.events_path(order_id);
    let Some(raw) = read_optional(&path).await? else {
      return Ok(Vec::new());
    };
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    let mut events = Vec::with_capacity(values.len());
    for value in values {
      match serde_json::from_value::<OrderEvent>(value) {
        Ok(event) => events.push(event),
        Err(e) => warn!("evento descartado en {}: {}", path.display(), e),
      }
    }
    Ok(events)
  }
}
