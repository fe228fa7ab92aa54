// catalog.rs
// Catálogo embebido con las dos definiciones que sirve el backend. Se usa
// cuando la fuente de datos no provee una definición propia.
use crate::{Stage, StageDescriptor, StatusDescriptor, WorkflowDefinition, WorkflowType};
use once_cell::sync::Lazy;

type CatalogTable = &'static [(Stage, &'static [(&'static str, &'static str)])];

const MATERIALS_ONLY_TABLE: CatalogTable = &[
  (Stage::LeadAcquisition, &[("NEW_LEAD", "New Lead"), ("QUOTE_REQUESTED", "Quote Requested")]),
  (Stage::Quotation,
   &[("QUOTE_PREPARED", "Quote Prepared"), ("QUOTE_SENT", "Quote Sent"), ("QUOTE_ACCEPTED", "Quote Accepted")]),
  (Stage::Procurement,
   &[("PO_CREATED", "PO Created"),
     ("PO_SENT", "PO Sent"),
     ("SUPPLIER_CONFIRMED", "Supplier Confirmed"),
     ("MATERIALS_ORDERED", "Materials Ordered")]),
  (Stage::Fulfillment,
   &[("PARTIAL_RECEIVED", "Partial Received"),
     ("MATERIALS_RECEIVED", "Materials Received"),
     ("CUSTOMER_NOTIFIED", "Customer Notified"),
     ("READY_FOR_PICKUP", "Ready for Pickup"),
     ("DELIVERY_SCHEDULED", "Delivery Scheduled"),
     ("DELIVERED", "Delivered")]),
  (Stage::Finalization,
   &[("INVOICE_SENT", "Invoice Sent"),
     ("PAYMENT_RECEIVED", "Payment Received"),
     ("COMPLETED", "Completed"),
     ("FOLLOW_UP_SENT", "Follow-up Sent")]),
];

const MATERIALS_AND_INSTALLATION_TABLE: CatalogTable = &[
  (Stage::LeadAcquisition,
   &[("NEW_LEAD", "New Lead"),
     ("SITE_VISIT_SCHEDULED", "Site Visit Scheduled"),
     ("SITE_VISIT_COMPLETED", "Site Visit Completed")]),
  (Stage::Quotation,
   &[("QUOTE_REQUESTED", "Quote Requested"),
     ("QUOTE_PREPARED", "Quote Prepared"),
     ("QUOTE_SENT", "Quote Sent"),
     ("QUOTE_ACCEPTED", "Quote Accepted")]),
  (Stage::Procurement,
   &[("WORK_ORDER_CREATED", "Work Order Created"),
     ("WORK_ORDER_SENT", "Work Order Sent"),
     ("WORK_ORDER_SIGNED", "Work Order Signed"),
     ("DEPOSIT_REQUESTED", "Deposit Requested"),
     ("DEPOSIT_RECEIVED", "Deposit Received"),
     ("DETAILED_MEASUREMENT", "Detailed Measurement"),
     ("PO_CREATED", "PO Created"),
     ("MATERIALS_ORDERED", "Materials Ordered")]),
  (Stage::Fulfillment,
   &[("INSTALLATION_SCHEDULED", "Installation Scheduled"),
     ("MATERIALS_RECEIVED", "Materials Received"),
     ("INSTALLATION_READY", "Installation Ready"),
     ("INSTALLATION_IN_PROGRESS", "Installation In Progress"),
     ("INSTALLATION_COMPLETED", "Installation Completed"),
     ("FINAL_INSPECTION", "Final Inspection")]),
  (Stage::Finalization,
   &[("INVOICE_SENT", "Invoice Sent"),
     ("PAYMENT_RECEIVED", "Payment Received"),
     ("COMPLETED", "Completed"),
     ("REVIEW_REQUESTED", "Review Requested")]),
];

static MATERIALS_ONLY: Lazy<WorkflowDefinition> =
  Lazy::new(|| build(WorkflowType::MaterialsOnly, MATERIALS_ONLY_TABLE));

static MATERIALS_AND_INSTALLATION: Lazy<WorkflowDefinition> =
  Lazy::new(|| build(WorkflowType::MaterialsAndInstallation, MATERIALS_AND_INSTALLATION_TABLE));

fn build(workflow_type: WorkflowType, table: CatalogTable) -> WorkflowDefinition {
  let stages = table.iter()
                    .map(|(stage, statuses)| {
                      StageDescriptor::new(*stage,
                                           stage.display_name(),
                                           statuses.iter().map(|(id, name)| StatusDescriptor::new(*id, *name)).collect())
                    })
                    .collect();
  WorkflowDefinition { workflow_type: Some(workflow_type), stages }
}

impl WorkflowDefinition {
  /// Definición embebida para el tipo de workflow indicado.
  pub fn builtin(workflow_type: WorkflowType) -> &'static WorkflowDefinition {
    match workflow_type {
      WorkflowType::MaterialsOnly => &MATERIALS_ONLY,
      WorkflowType::MaterialsAndInstallation => &MATERIALS_AND_INSTALLATION,
    }
  }
}
