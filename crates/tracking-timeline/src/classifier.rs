// Archivo: classifier.rs
// Propósito: clasificar un id de estado en una de las etapas del pipeline.
//
// La tabla de pertenencia es un dato explícito (`StageTable`): la estándar
// reproduce la tabla histórica compartida con el backend y
// `StageTable::for_workflow` antepone la pertenencia declarada por una
// `WorkflowDefinition`, de modo que la definición externa manda.
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use tracking_domain::{Stage, WorkflowDefinition};

const LEAD_ACQUISITION_STATUSES: &[&str] = &["NEW_LEAD",
                                             "QUOTE_REQUESTED",
                                             "SITE_VISIT_SCHEDULED",
                                             "SITE_VISIT_COMPLETED",
                                             "DETAILED_MEASUREMENT_SCHEDULED",
                                             "DETAILED_MEASUREMENT_COMPLETED"];

const QUOTATION_STATUSES: &[&str] = &["QUOTE_PREPARED", "QUOTE_SENT", "QUOTE_APPROVED", "QUOTE_ACCEPTED"];

const PROCUREMENT_STATUSES: &[&str] = &["WORK_ORDER_SENT",
                                        "WORK_ORDER_SIGNED",
                                        "MATERIALS_ORDERED",
                                        "MATERIALS_RECEIVED",
                                        "MATERIALS_BACKORDERED",
                                        "WORK_ORDER_CREATED",
                                        "DEPOSIT_REQUESTED",
                                        "DEPOSIT_RECEIVED",
                                        "DEPOSIT_PENDING",
                                        "DETAILED_MEASUREMENT",
                                        "PO_CREATED",
                                        "PO_SENT",
                                        "SUPPLIER_CONFIRMED"];

const FULFILLMENT_STATUSES: &[&str] = &["DELIVERY_SCHEDULED",
                                        "DELIVERY_COMPLETED",
                                        "DELIVERED",
                                        "INSTALLATION_SCHEDULED",
                                        "INSTALLATION_IN_PROGRESS",
                                        "INSTALLATION_COMPLETED",
                                        "DELIVERY_DELAYED",
                                        "INSTALLATION_DELAYED",
                                        "MATERIALS_RECEIVED",
                                        "INSTALLATION_READY",
                                        "FINAL_INSPECTION",
                                        "PARTIAL_RECEIVED",
                                        "CUSTOMER_NOTIFIED",
                                        "READY_FOR_PICKUP",
                                        "IN_TRANSIT"];

const FINALIZATION_STATUSES: &[&str] = &["PAYMENT_RECEIVED",
                                         "ORDER_COMPLETED",
                                         "COMPLETED",
                                         "FOLLOW_UP_SCHEDULED",
                                         "FOLLOW_UP_SENT",
                                         "INVOICE_SENT",
                                         "REVIEW_REQUESTED",
                                         "PENDING_FINAL_PAYMENT"];

const CANCELLED_STATUSES: &[&str] = &["ORDER_CANCELLED", "QUOTE_REJECTED"];

const ON_HOLD_STATUSES: &[&str] =
  &["CUSTOMER_COMMUNICATION_NEEDED", "AWAITING_CUSTOMER_APPROVAL", "CHANGE_ORDER_REQUESTED", "PAYMENT_PENDING"];

static STANDARD_TABLE: Lazy<StageTable> = Lazy::new(|| {
  let mut table = StageTable::empty();
  table.push(Stage::LeadAcquisition, LEAD_ACQUISITION_STATUSES.iter().copied());
  table.push(Stage::Quotation, QUOTATION_STATUSES.iter().copied());
  table.push(Stage::Procurement, PROCUREMENT_STATUSES.iter().copied());
  table.push(Stage::Fulfillment, FULFILLMENT_STATUSES.iter().copied());
  table.push(Stage::Finalization, FINALIZATION_STATUSES.iter().copied());
  table.push(Stage::Cancelled, CANCELLED_STATUSES.iter().copied());
  table.push(Stage::OnHold, ON_HOLD_STATUSES.iter().copied());
  table
});

/// Tabla ordenada de pertenencia etapa -> conjunto de ids de estado.
///
/// Las entradas se consultan en el orden en que fueron agregadas; la
/// primera que contiene el estado gana, aunque otra posterior también lo
/// contenga.
#[derive(Clone, Debug, Default)]
pub struct StageTable {
  entries: Vec<(Stage, HashSet<String>)>,
}

impl StageTable {
  pub fn empty() -> Self {
    Self { entries: Vec::new() }
  }

  /// Tabla histórica: etapas lineales en orden, luego canceladas y en
  /// espera.
  pub fn standard() -> &'static StageTable {
    &STANDARD_TABLE
  }

  /// Tabla para una definición: primero la pertenencia que declara la
  /// definición (en orden lineal de etapas, las fuera de banda al final) y
  /// después la tabla estándar como respaldo para ids históricos.
  pub fn for_workflow(definition: &WorkflowDefinition) -> StageTable {
    let mut declared: Vec<_> = definition.stages.iter().collect();
    declared.sort_by_key(|s| s.id);
    let mut table = StageTable::empty();
    for stage in declared {
      table.push(stage.id, stage.statuses.iter().map(|s| s.id.as_str()));
    }
    table.entries.extend(STANDARD_TABLE.entries.iter().cloned());
    table
  }

  /// Agrega una entrada al final de la tabla. Los ids se normalizan a
  /// mayúsculas.
  pub fn push<'a, I>(&mut self, stage: Stage, statuses: I)
    where I: IntoIterator<Item = &'a str>
  {
    let set = statuses.into_iter().map(normalize).collect();
    self.entries.push((stage, set));
  }

  /// Primera etapa que declara el estado, sin aplicar el valor por defecto.
  pub fn lookup(&self, status: &str) -> Option<Stage> {
    let normalized = normalize(status);
    self.entries.iter().find(|(_, set)| set.contains(&normalized)).map(|(stage, _)| *stage)
  }

  /// Todos los ids conocidos con la etapa que les asigna la tabla.
  pub fn known_statuses(&self) -> Vec<(String, Stage)> {
    let mut out = Vec::new();
    for (stage, set) in &self.entries {
      for status in set {
        if self.lookup(status) == Some(*stage) {
          out.push((status.clone(), *stage));
        }
      }
    }
    out.sort();
    out.dedup();
    out
  }
}

fn normalize(status: &str) -> String {
  status.trim().to_uppercase()
}

/// Clasifica un estado con la tabla dada.
///
/// Nunca falla: un estado vacío o desconocido cae en `LEAD_ACQUISITION`.
pub fn classify(status: &str, table: &StageTable) -> Stage {
  match table.lookup(status) {
    Some(stage) => stage,
    None => {
      debug!("estado sin etapa conocida '{}', se asume {}", status, Stage::LeadAcquisition);
      Stage::LeadAcquisition
    }
  }
}

/// Clasificador ligado a una tabla concreta.
#[derive(Clone, Debug)]
pub struct StageClassifier {
  table: StageTable,
}

impl StageClassifier {
  pub fn new(table: StageTable) -> Self {
    Self { table }
  }

  /// Clasificador con la tabla estándar.
  pub fn standard() -> Self {
    Self::new(StageTable::standard().clone())
  }

  /// Clasificador cuya tabla prioriza la definición dada.
  pub fn for_workflow(definition: &WorkflowDefinition) -> Self {
    Self::new(StageTable::for_workflow(definition))
  }

  pub fn classify(&self, status: &str) -> Stage {
    classify(status, &self.table)
  }
}
