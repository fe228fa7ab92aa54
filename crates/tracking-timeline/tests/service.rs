use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracking_domain::{OrderEvent, OrderSnapshot, Stage, WorkflowType};
use tracking_timeline::config::{ENV_DATA_DIR, ENV_DEFAULT_WORKFLOW, ENV_EXTRACTION, ENV_FALLBACK_STATUS};
use tracking_timeline::{
  EventFilter, ExtractionPreference, InMemoryTrackingSource, JsonDirectorySource, OrderTrackingService, TimelineError,
  TrackingConfig, TrackingSource,
};

fn installation_source() -> InMemoryTrackingSource {
  let source = InMemoryTrackingSource::new();
  source.put_order(OrderSnapshot::new(7).with_workflow_type(WorkflowType::MaterialsAndInstallation)
                                        .with_completed(["NEW_LEAD", "SITE_VISIT_SCHEDULED"])
                                        .with_current_status("SITE_VISIT_COMPLETED"));
  let at = |m| Utc.with_ymd_and_hms(2024, 7, 1, 10, m, 0).unwrap();
  source.push_event(7, OrderEvent::new(1, "order_creation", "Order created", at(0)));
  source.push_event(7, OrderEvent::new(2, "workflow_status_change", "Status changed to SITE_VISIT_COMPLETED", at(30)));
  source.push_event(7, OrderEvent::new(3, "note", "Measured the kitchen", at(35)));
  source
}

#[tokio::test]
async fn tracks_order_from_memory_source() {
  let service = OrderTrackingService::new(Arc::new(installation_source()), TrackingConfig::default());
  let tracking = service.track(7, &EventFilter::default()).await.unwrap();

  // 2 de 25
  assert_eq!(tracking.progress, 8);
  assert_eq!(tracking.current_status.id, "SITE_VISIT_COMPLETED");
  let lead = &tracking.timelines[&Stage::LeadAcquisition];
  assert_eq!(lead.events.len(), 3);
  assert_eq!(lead.status_items().count(), 3);
  assert_eq!(lead.event_items().map(|e| e.event_id).collect::<Vec<_>>(), vec![1, 3]);
  assert_eq!(tracking.most_recent_event_id, Some(3));
}

#[tokio::test]
async fn missing_order_is_not_ready() {
  let service = OrderTrackingService::new(Arc::new(InMemoryTrackingSource::new()), TrackingConfig::default());
  let err = service.track(99, &EventFilter::default()).await.unwrap_err();
  assert!(matches!(err, TimelineError::DataNotReady(_)));
  assert!(matches!(service.next_status(99).await, Err(TimelineError::DataNotReady(_))));
}

#[tokio::test]
async fn unknown_order_type_uses_configured_default() {
  let source = InMemoryTrackingSource::new();
  let mut order = OrderSnapshot::new(5).with_current_status("QUOTE_SENT");
  order.workflow_type = Some("SOMETHING_ELSE".into());
  source.put_order(order.clone());

  let cfg = TrackingConfig { default_workflow: WorkflowType::MaterialsAndInstallation, ..TrackingConfig::default() };
  let service = OrderTrackingService::new(Arc::new(source), cfg);
  assert_eq!(service.workflow_type_for(&order), WorkflowType::MaterialsAndInstallation);
  let tracking = service.track(5, &EventFilter::default()).await.unwrap();
  assert_eq!(tracking.timelines[&Stage::Procurement].status_items().count(), 8);
}

#[tokio::test]
async fn next_status_walks_the_workflow() {
  let source = installation_source();
  source.put_order(OrderSnapshot::new(8).with_current_status("QUOTE_SENT"));
  source.put_order(OrderSnapshot::new(9));
  source.put_order(OrderSnapshot::new(10).with_current_status("FOLLOW_UP_SENT"));
  let service = OrderTrackingService::new(Arc::new(source), TrackingConfig::default());

  let next = service.next_status(7).await.unwrap().map(|s| s.id);
  assert_eq!(next.as_deref(), Some("QUOTE_REQUESTED"));
  let next = service.next_status(8).await.unwrap().map(|s| s.id);
  assert_eq!(next.as_deref(), Some("QUOTE_ACCEPTED"));
  let next = service.next_status(9).await.unwrap().map(|s| s.id);
  assert_eq!(next.as_deref(), Some("NEW_LEAD"));
  assert!(service.next_status(10).await.unwrap().is_none());
}

fn write_json(root: &Path, rel: &str, value: serde_json::Value) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

#[tokio::test]
async fn json_directory_source_reads_backend_shapes() {
  let dir = tempfile::tempdir().unwrap();
  write_json(dir.path(),
             "orders/12.json",
             json!({"order": {"order_id": 12,
                              "type": "MATERIALS_ONLY",
                              "current_status": "QUOTE_SENT",
                              "completed_statuses": ["NEW_LEAD", "QUOTE_REQUESTED", "QUOTE_PREPARED"],
                              "status_history": null}}));
  write_json(dir.path(),
             "order-events/12.json",
             json!([
               {"event_id": 1, "event_type": "order_creation", "description": "Order created",
                "created_at": "2024-03-01T09:00:00"},
               {"event_id": 2, "event_type": "workflow_status_change",
                "description": "Status changed to QUOTE_SENT", "created_at": "2024-03-02T10:15:00Z"},
               {"event_id": 3, "event_type": "note", "description": "sin fecha"},
               {"event_id": 4, "event_type": "custom_import", "description": "Imported",
                "created_at": "2024-03-03"}
             ]));

  let source = JsonDirectorySource::new(dir.path());
  let order = source.fetch_order(12).await.unwrap().unwrap();
  assert_eq!(order.workflow_type(), WorkflowType::MaterialsOnly);
  assert!(order.status_history.is_empty());
  let events = source.fetch_events(12).await.unwrap();
  assert_eq!(events.iter().map(|e| e.event_id).collect::<Vec<_>>(), vec![1, 2, 4]);
  assert!(source.fetch_order(13).await.unwrap().is_none());
  assert!(source.fetch_events(13).await.unwrap().is_empty());

  let service = OrderTrackingService::new(Arc::new(source), TrackingConfig::default().with_data_dir(dir.path()));
  let tracking = service.track(12, &EventFilter::default()).await.unwrap();
  assert_eq!(tracking.progress, 16);
  let quote = &tracking.timelines[&Stage::Quotation];
  // evento 4 (tipo desconocido) se interpola al último cambio: QUOTE_SENT
  assert_eq!(quote.events.iter().map(|e| e.event_id).collect::<Vec<_>>(), vec![2, 4]);
  let sent = quote.status_items().find(|s| s.status.id == "QUOTE_SENT").unwrap();
  assert_eq!(sent.status_change_event_id, Some(2));
}

#[tokio::test]
async fn json_directory_source_prefers_workflow_file() {
  let dir = tempfile::tempdir().unwrap();
  write_json(dir.path(),
             "workflows/MATERIALS_ONLY.json",
             json!({"workflow_type": "MATERIALS_ONLY",
                    "stages": [
                      {"id": "LEAD_ACQUISITION", "name": "Leads",
                       "statuses": [{"id": "INQUIRY", "name": "Inquiry"}]},
                      {"id": "FINALIZATION", "name": "Closing",
                       "statuses": [{"id": "CLOSED", "name": "Closed"}]}
                    ]}));
  write_json(dir.path(), "orders/1.json", json!({"order_id": 1, "current_status": "CLOSED"}));

  let source = JsonDirectorySource::new(dir.path());
  let def = source.fetch_workflow(WorkflowType::MaterialsOnly).await.unwrap().unwrap();
  assert_eq!(def.total_statuses(), 2);
  let builtin = source.fetch_workflow(WorkflowType::MaterialsAndInstallation).await.unwrap().unwrap();
  assert_eq!(builtin.total_statuses(), 25);

  let service = OrderTrackingService::new(Arc::new(source), TrackingConfig::default());
  let tracking = service.track(1, &EventFilter::default()).await.unwrap();
  assert_eq!(tracking.timelines.keys().copied().collect::<Vec<_>>(), vec![Stage::LeadAcquisition, Stage::Finalization]);
  assert_eq!(tracking.current_stage.as_deref(), Some("Closing"));
}

#[tokio::test]
async fn malformed_files_surface_as_source_errors() {
  let dir = tempfile::tempdir().unwrap();
  fs::create_dir_all(dir.path().join("orders")).unwrap();
  fs::write(dir.path().join("orders/3.json"), "{ not json").unwrap();
  write_json(dir.path(), "workflows/MATERIALS_ONLY.json", json!({"stages": []}));

  let source = JsonDirectorySource::new(dir.path());
  assert!(matches!(source.fetch_order(3).await, Err(TimelineError::Source(_))));
  assert!(matches!(source.fetch_workflow(WorkflowType::MaterialsOnly).await, Err(TimelineError::Source(_))));
}

#[test]
fn config_from_vars() {
  let vars: HashMap<&str, &str> = HashMap::from([(ENV_DATA_DIR, "/srv/tracking"),
                                                 (ENV_DEFAULT_WORKFLOW, "materials_and_installation"),
                                                 (ENV_EXTRACTION, "structured_first"),
                                                 (ENV_FALLBACK_STATUS, " new_lead ")]);
  let cfg = TrackingConfig::from_vars(|k| vars.get(k).map(|v| v.to_string())).unwrap();
  assert_eq!(cfg.data_dir, Path::new("/srv/tracking"));
  assert_eq!(cfg.default_workflow, WorkflowType::MaterialsAndInstallation);
  assert_eq!(cfg.extraction, ExtractionPreference::StructuredFirst);
  assert_eq!(cfg.fallback_status, "NEW_LEAD");

  let defaults = TrackingConfig::from_vars(|_| None).unwrap();
  assert_eq!(defaults, TrackingConfig::default());
}

#[test]
fn config_rejects_invalid_values() {
  let bad_extraction = TrackingConfig::from_vars(|k| (k == ENV_EXTRACTION).then(|| "guess".to_string()));
  assert!(matches!(bad_extraction, Err(TimelineError::Config(_))));
  let bad_workflow = TrackingConfig::from_vars(|k| (k == ENV_DEFAULT_WORKFLOW).then(|| "PLUMBING".to_string()));
  assert!(matches!(bad_workflow, Err(TimelineError::Config(_))));
}
