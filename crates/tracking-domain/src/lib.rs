//! tracking-domain: modelo de datos del seguimiento de órdenes
//!
//! Define las etapas del pipeline (`Stage`), el catálogo de estados
//! (`WorkflowDefinition`), la foto de la orden (`OrderSnapshot`) y los
//! eventos de auditoría (`OrderEvent`). Todo es de sólo lectura para el
//! motor de timeline: la fuente de verdad es el backend.
mod catalog;
mod errors;
mod event;
mod order;
mod stage;
pub mod timestamp;
mod workflow;
mod workflow_type;

pub use errors::DomainError;
pub use event::{EventType, OrderEvent};
pub use order::{OrderSnapshot, StatusHistoryEntry};
pub use stage::Stage;
pub use workflow::{StageDescriptor, StatusDescriptor, StatusId, WorkflowDefinition};
pub use workflow_type::WorkflowType;
