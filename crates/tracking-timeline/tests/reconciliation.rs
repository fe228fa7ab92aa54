use chrono::{DateTime, TimeZone, Utc};
use tracking_domain::{
  OrderEvent, OrderSnapshot, Stage, StageDescriptor, StatusDescriptor, StatusHistoryEntry, WorkflowDefinition,
  WorkflowType,
};
use tracking_timeline::{
  build_stage_timelines, ExtractionPreference, StageClassifier, StageTimelines, TimelineItem, TimelineReconciler,
};

fn ts(minute: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 4, 2, 9, minute, 0).unwrap()
}

/// Workflow mínimo: A y B en adquisición, C en cotización.
fn abc_workflow() -> WorkflowDefinition {
  WorkflowDefinition::new(None,
                          vec![StageDescriptor::new(Stage::LeadAcquisition,
                                                    "Lead Acquisition",
                                                    vec![StatusDescriptor::new("A", "Status A"),
                                                         StatusDescriptor::new("B", "Status B")]),
                               StageDescriptor::new(Stage::Quotation,
                                                    "Quotation",
                                                    vec![StatusDescriptor::new("C", "Status C")])])
    .expect("workflow válido")
}

fn change(id: i64, status: &str, minute: u32) -> OrderEvent {
  OrderEvent::new(id, "workflow_status_change", format!("Status changed to {}", status), ts(minute))
}

fn note(id: i64, minute: u32) -> OrderEvent {
  OrderEvent::new(id, "note", format!("nota {}", id), ts(minute))
}

fn labels(timelines: &StageTimelines, stage: Stage) -> Vec<String> {
  timelines[&stage].items
                   .iter()
                   .map(|item| match item {
                     TimelineItem::Status(s) => s.status.id.clone(),
                     TimelineItem::Event(e) => format!("ev{}", e.event_id),
                   })
                   .collect()
}

fn bucket_ids(timelines: &StageTimelines, stage: Stage) -> Vec<i64> {
  timelines[&stage].events.iter().map(|e| e.event_id).collect()
}

#[test]
fn linear_happy_path() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_completed(["A"]).with_current_status("B");
  let events = vec![change(10, "B", 1)];

  let timelines = build_stage_timelines(&def, &order, &events);
  assert_eq!(timelines.keys().copied().collect::<Vec<_>>(), vec![Stage::LeadAcquisition, Stage::Quotation]);

  let lead: Vec<_> = timelines[&Stage::LeadAcquisition].status_items().collect();
  assert_eq!(lead.len(), 2);
  assert_eq!(lead[0].status.id, "A");
  assert!(lead[0].is_completed && !lead[0].is_current && !lead[0].is_future);
  assert_eq!(lead[0].timestamp, None);
  assert_eq!(lead[1].status.id, "B");
  assert!(lead[1].is_current && !lead[1].is_future);
  assert_eq!(lead[1].timestamp, Some(ts(1)));
  assert_eq!(lead[1].status_change_event_id, Some(10));
  // el cambio de estado ancla a B y no se repite como fila de evento
  assert_eq!(labels(&timelines, Stage::LeadAcquisition), vec!["A", "B"]);
  assert_eq!(bucket_ids(&timelines, Stage::LeadAcquisition), vec![10]);

  let quote: Vec<_> = timelines[&Stage::Quotation].status_items().collect();
  assert_eq!(quote.len(), 1);
  assert_eq!(quote[0].status.id, "C");
  assert!(quote[0].is_future);
  assert_eq!(quote[0].timestamp, None);
}

#[test]
fn out_of_order_completion_is_tolerated() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_completed(["C"]).with_current_status("A");

  let timelines = build_stage_timelines(&def, &order, &[]);
  let lead: Vec<_> = timelines[&Stage::LeadAcquisition].status_items().collect();
  assert_eq!(lead[0].status.id, "A");
  assert!(lead[0].is_current);
  assert!(lead[1].is_future);

  let quote: Vec<_> = timelines[&Stage::Quotation].status_items().collect();
  assert_eq!(quote.len(), 1);
  assert_eq!(quote[0].status.id, "C");
  assert!(quote[0].is_completed && !quote[0].is_future);
}

#[test]
fn unparseable_status_change_lands_in_order_workflow_status_stage() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_current_status("A").with_workflow_status("C");
  let garbled = OrderEvent::new(5, "workflow_status_change", "garbled text", ts(3));

  let timelines = build_stage_timelines(&def, &order, &[garbled]);
  assert_eq!(bucket_ids(&timelines, Stage::Quotation), vec![5]);
  assert!(bucket_ids(&timelines, Stage::LeadAcquisition).is_empty());
  // no ancla ningún estado, así que se muestra como evento
  assert_eq!(labels(&timelines, Stage::Quotation), vec!["ev5", "C"]);
}

#[test]
fn unparseable_status_change_without_order_status_uses_fallback() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1);
  let garbled = OrderEvent::new(5, "workflow_status_change", "???", ts(3));
  let timelines = build_stage_timelines(&def, &order, &[garbled]);
  assert_eq!(bucket_ids(&timelines, Stage::LeadAcquisition), vec![5]);
}

#[test]
fn emits_exactly_one_status_item_per_descriptor() {
  for wt in WorkflowType::ALL {
    let def = WorkflowDefinition::builtin(wt);
    let order = OrderSnapshot::new(9).with_completed(["NEW_LEAD", "QUOTE_SENT", "DELIVERED", "UNRELATED"])
                                     .with_current_status("PO_CREATED");
    let events = vec![change(1, "QUOTE_SENT", 2),
                      change(2, "QUOTE_SENT", 4),
                      change(3, "PO_CREATED", 6),
                      change(4, "NOT_IN_WORKFLOW", 8),
                      note(5, 7)];
    let timelines = build_stage_timelines(def, &order, &events);
    let total: usize = timelines.values().map(|t| t.status_items().count()).sum();
    assert_eq!(total, def.total_statuses());
    for stage in &def.stages {
      let ids: Vec<&str> = timelines[&stage.id].status_items().map(|s| s.status.id.as_str()).collect();
      let mut expected: Vec<&str> = stage.statuses.iter().map(|s| s.id.as_str()).collect();
      let mut got = ids.clone();
      got.sort();
      expected.sort();
      assert_eq!(got, expected);
    }
    // cada evento cae en exactamente una cubeta
    let bucketed: usize = timelines.values().map(|t| t.events.len()).sum();
    assert_eq!(bucketed, events.len());
  }
}

#[test]
fn future_items_never_precede_timestamped_completed_items() {
  let def = WorkflowDefinition::builtin(WorkflowType::MaterialsAndInstallation);
  let order = OrderSnapshot::new(3).with_completed(["WORK_ORDER_CREATED", "DEPOSIT_RECEIVED", "PO_CREATED"])
                                   .with_current_status("MATERIALS_ORDERED");
  let events = vec![change(1, "DEPOSIT_RECEIVED", 10),
                    change(2, "WORK_ORDER_CREATED", 3),
                    change(3, "PO_CREATED", 20),
                    note(4, 15)];
  let timelines = build_stage_timelines(def, &order, &events);
  for timeline in timelines.values() {
    let mut seen_future = false;
    for item in &timeline.items {
      if let TimelineItem::Status(s) = item {
        if s.is_future {
          seen_future = true;
        } else if s.is_completed && s.timestamp.is_some() {
          assert!(!seen_future, "futuro antes de {} en {}", s.status.id, timeline.stage);
        }
      }
    }
  }
  assert_eq!(labels(&timelines, Stage::Procurement),
             vec!["WORK_ORDER_CREATED",
                  "DEPOSIT_RECEIVED",
                  "ev4",
                  "PO_CREATED",
                  "MATERIALS_ORDERED",
                  "WORK_ORDER_SENT",
                  "WORK_ORDER_SIGNED",
                  "DEPOSIT_REQUESTED",
                  "DETAILED_MEASUREMENT"]);
}

#[test]
fn equal_timestamps_keep_bucket_order() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_current_status("A");
  let events = vec![note(8, 5), note(3, 5), note(6, 5)];
  let timelines = build_stage_timelines(&def, &order, &events);
  assert_eq!(labels(&timelines, Stage::LeadAcquisition), vec!["ev8", "ev3", "ev6", "A", "B"]);
}

#[test]
fn temporal_interpolation_uses_latest_preceding_change() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_completed(["A", "B"]).with_current_status("C");
  let events = vec![note(1, 0),
                    change(2, "C", 10),
                    note(3, 10),
                    note(4, 30),
                    OrderEvent::new(5, "payment", "Deposit", ts(5))];
  let timelines = build_stage_timelines(&def, &order, &events);
  // antes del primer cambio se asume NEW_LEAD -> adquisición
  assert_eq!(bucket_ids(&timelines, Stage::LeadAcquisition), vec![1, 5]);
  // el cambio ocurre en el mismo instante que la nota 3: cuenta como previo
  assert_eq!(bucket_ids(&timelines, Stage::Quotation), vec![2, 3, 4]);
  assert_eq!(labels(&timelines, Stage::Quotation), vec!["C", "ev3", "ev4"]);
  assert_eq!(labels(&timelines, Stage::LeadAcquisition), vec!["ev1", "ev5", "A", "B"]);
}

#[test]
fn explicit_event_types_override_interpolation() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_current_status("C");
  let events = vec![change(1, "C", 1),
                    OrderEvent::new(2, "order_creation", "Order created", ts(2)),
                    OrderEvent::new(3, "stage_change", "moved", ts(3)).with_new_stage("b"),
                    OrderEvent::new(4, "stage_change", "moved", ts(4))];
  let timelines = build_stage_timelines(&def, &order, &events);
  assert_eq!(bucket_ids(&timelines, Stage::LeadAcquisition), vec![2, 3]);
  // stage_change sin new_stage se interpola: C -> cotización
  assert_eq!(bucket_ids(&timelines, Stage::Quotation), vec![1, 4]);
}

#[test]
fn stages_missing_from_definition_fall_back_to_first_stage() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1);
  let events = vec![OrderEvent::new(1, "stage_change", "to procurement", ts(1)).with_new_stage("PO_CREATED"),
                    change(2, "ORDER_CANCELLED", 2)];
  let timelines = build_stage_timelines(&def, &order, &events);
  assert_eq!(bucket_ids(&timelines, Stage::LeadAcquisition), vec![1, 2]);
  // ORDER_CANCELLED no es un estado de la definición: no ancla y se ve
  assert_eq!(labels(&timelines, Stage::LeadAcquisition), vec!["ev1", "ev2", "A", "B"]);
}

#[test]
fn out_of_band_stage_populates_when_declared() {
  let mut def = abc_workflow();
  def.stages.push(StageDescriptor::new(Stage::Cancelled,
                                       "Cancelled",
                                       vec![StatusDescriptor::new("ORDER_CANCELLED", "Order Cancelled")]));
  let order = OrderSnapshot::new(1).with_current_status("ORDER_CANCELLED");
  let events = vec![change(1, "ORDER_CANCELLED", 4)];
  let timelines = build_stage_timelines(&def, &order, &events);
  assert_eq!(timelines.len(), 3);
  let cancelled: Vec<_> = timelines[&Stage::Cancelled].status_items().collect();
  assert!(cancelled[0].is_current);
  assert_eq!(cancelled[0].timestamp, Some(ts(4)));
}

#[test]
fn repeated_transitions_keep_earliest_anchor_and_show_the_rest() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_current_status("B");
  let events = vec![change(1, "B", 9), change(2, "B", 3), change(3, "A", 1)];
  let timelines = build_stage_timelines(&def, &order, &events);
  let lead: Vec<_> = timelines[&Stage::LeadAcquisition].status_items().collect();
  assert_eq!(lead[1].timestamp, Some(ts(3)));
  assert_eq!(lead[1].status_change_event_id, Some(2));
  assert_eq!(labels(&timelines, Stage::LeadAcquisition), vec!["A", "B", "ev1"]);
}

#[test]
fn structured_first_extraction_reads_event_fields() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_current_status("C");
  let event = change(1, "A", 2).with_new_status("C");
  let description_first = build_stage_timelines(&def, &order, std::slice::from_ref(&event));
  assert_eq!(bucket_ids(&description_first, Stage::LeadAcquisition), vec![1]);

  let reconciler = TimelineReconciler::with_classifier(StageClassifier::for_workflow(&def),
                                                       ExtractionPreference::StructuredFirst,
                                                       "NEW_LEAD");
  let structured_first = reconciler.build(&def, &order, &[event]);
  assert_eq!(bucket_ids(&structured_first, Stage::Quotation), vec![1]);
  let quote: Vec<_> = structured_first[&Stage::Quotation].status_items().collect();
  assert_eq!(quote[0].timestamp, Some(ts(2)));
}

#[test]
fn completion_info_comes_from_latest_history_entry() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_completed(["A"])
                                   .with_history(StatusHistoryEntry { status: "A".into(),
                                                                      completed_at: ts(1),
                                                                      completed_by: None,
                                                                      notes: Some("primera".into()) })
                                   .with_history(StatusHistoryEntry { status: "A".into(),
                                                                      completed_at: ts(7),
                                                                      completed_by: Some("ana".into()),
                                                                      notes: Some("segunda".into()) });
  let timelines = build_stage_timelines(&def, &order, &[]);
  let a = timelines[&Stage::LeadAcquisition].status_items().next().unwrap();
  assert_eq!(a.completion.as_ref().and_then(|c| c.notes.as_deref()), Some("segunda"));
}

#[test]
fn recomputation_is_pure() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_completed(["A"]).with_current_status("B");
  let events = vec![change(1, "B", 1), note(2, 2)];
  assert_eq!(build_stage_timelines(&def, &order, &events), build_stage_timelines(&def, &order, &events));
}

#[test]
fn lowercase_status_change_still_anchors_its_status() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_current_status("B");
  let events = vec![change(1, "b", 4)];
  let timelines = build_stage_timelines(&def, &order, &events);
  let lead: Vec<_> = timelines[&Stage::LeadAcquisition].status_items().collect();
  assert_eq!(lead[1].timestamp, Some(ts(4)));
  assert_eq!(lead[1].status_change_event_id, Some(1));
  assert_eq!(labels(&timelines, Stage::LeadAcquisition), vec!["B", "A"]);
}

#[test]
fn non_ascii_description_falls_back_to_structured_fields() {
  let def = abc_workflow();
  let order = OrderSnapshot::new(1).with_current_status("C");
  let events = vec![OrderEvent::new(1, "workflow_status_change", "Status changed to ÉTAT", ts(2)).with_new_stage("C")];
  let timelines = build_stage_timelines(&def, &order, &events);
  assert_eq!(bucket_ids(&timelines, Stage::Quotation), vec![1]);
  let quote: Vec<_> = timelines[&Stage::Quotation].status_items().collect();
  assert_eq!(quote[0].timestamp, Some(ts(2)));
  assert!(timelines[&Stage::Quotation].event_items().next().is_none());
}
