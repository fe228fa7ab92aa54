//! Crate `tracking-timeline`: clasificación de etapas y reconciliación de
//! la línea de tiempo de una orden.
//!
//! A partir de tres entradas ya materializadas (definición de workflow,
//! foto de la orden y eventos de auditoría) el motor produce, por etapa,
//! una línea de tiempo ordenada que mezcla los estados del workflow
//! (completados, actual y futuros) con los eventos.
//!
//! Diseño resumido:
//! - Función pura: nada se cachea ni se parchea; cada pasada recalcula.
//! - Mejor esfuerzo: datos ambiguos o desconocidos caen en etapas por
//!   defecto en lugar de producir errores. Sólo "datos no cargados" es un
//!   error.
//! - La carga (`TrackingSource`) es asíncrona y vive fuera del motor.
//!
//! Ejemplo rápido:
//! ```rust
//! use tracking_domain::{OrderSnapshot, WorkflowDefinition, WorkflowType};
//! let def = WorkflowDefinition::builtin(WorkflowType::MaterialsOnly);
//! let order = OrderSnapshot::new(1).with_current_status("NEW_LEAD");
//! let timelines = tracking_timeline::build_stage_timelines(def, &order, &[]);
//! assert_eq!(timelines.len(), def.stages.len());
//! ```
pub mod classifier;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod filter;
pub mod format;
pub mod progress;
pub mod reconciler;
pub mod service;
pub mod source;
pub mod stubs;
pub mod summary;
pub mod tracking;

pub use classifier::{classify, StageClassifier, StageTable};
pub use config::{ExtractionPreference, TrackingConfig};
pub use errors::{Result, TimelineError};
pub use filter::EventFilter;
pub use progress::calculate_progress;
pub use reconciler::{build_stage_timelines, StageTimeline, StageTimelines, StatusItem, TimelineItem, TimelineReconciler};
pub use service::OrderTrackingService;
pub use source::{JsonDirectorySource, TrackingSource};
pub use stubs::InMemoryTrackingSource;
pub use summary::{StageState, StageSummary};
pub use tracking::OrderTracking;
