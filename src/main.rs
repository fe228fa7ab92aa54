use anyhow::{Context, Result};
use chrono::Utc;
use std::io::{self, Write};
use std::sync::Arc;
use tracking_domain::{WorkflowDefinition, WorkflowType};
use tracking_timeline::format::{format_exact, format_relative, user_display};
use tracking_timeline::{
    EventFilter, JsonDirectorySource, OrderTracking, OrderTrackingService, TimelineItem, TrackingConfig,
};

/// Pequeño menú interactivo para consultar el seguimiento de órdenes
/// usando un directorio de archivos JSON como fuente.
///
/// Opciones soportadas:
/// 1) Ver línea de tiempo de una orden
/// 2) Ver resumen (progreso y etapas)
/// 3) Buscar eventos de una orden
/// 4) Siguiente estado de una orden
/// 5) Listar workflows embebidos
/// 6) Salir
fn main() -> Result<()> {
    env_logger::init();
    let config = TrackingConfig::from_env().context("configuración inválida")?;
    let source = Arc::new(JsonDirectorySource::new(config.data_dir.clone()));
    log::info!("fuente de datos: {}", source.root().display());
    let service = OrderTrackingService::new(source, config);
    let runtime = tokio::runtime::Runtime::new().context("no se pudo iniciar el runtime")?;

    loop {
        println!("\n== Order tracking menu ==");
        println!("1) Ver línea de tiempo de una orden");
        println!("2) Ver resumen (progreso y etapas)");
        println!("3) Buscar eventos de una orden");
        println!("4) Siguiente estado de una orden");
        println!("5) Listar workflows embebidos");
        println!("6) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                let Some(order_id) = prompt_order_id()? else { continue };
                match runtime.block_on(service.track(order_id, &EventFilter::default())) {
                    Ok(tracking) => print_timeline(&tracking),
                    Err(e) => eprintln!("Error cargando la orden: {}", e),
                }
            }
            "2" => {
                let Some(order_id) = prompt_order_id()? else { continue };
                match runtime.block_on(service.track(order_id, &EventFilter::default())) {
                    Ok(tracking) => print_summary(&tracking),
                    Err(e) => eprintln!("Error cargando la orden: {}", e),
                }
            }
            "3" => {
                let Some(order_id) = prompt_order_id()? else { continue };
                let term = prompt("Texto a buscar: ")?;
                match runtime.block_on(service.track(order_id, &EventFilter::new(term))) {
                    Ok(tracking) => print_timeline(&tracking),
                    Err(e) => eprintln!("Error cargando la orden: {}", e),
                }
            }
            "4" => {
                let Some(order_id) = prompt_order_id()? else { continue };
                match runtime.block_on(service.next_status(order_id)) {
                    Ok(Some(next)) => println!("Siguiente estado: {} ({})", next.name, next.id),
                    Ok(None) => println!("La orden está en el último estado del workflow"),
                    Err(e) => eprintln!("Error cargando la orden: {}", e),
                }
            }
            "5" => {
                for wt in WorkflowType::ALL {
                    print_workflow(wt, WorkflowDefinition::builtin(wt));
                }
            }
            "6" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

fn prompt_order_id() -> io::Result<Option<i64>> {
    let raw = prompt("Order id (número entero): ")?;
    match raw.trim().parse() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            eprintln!("Id inválido");
            Ok(None)
        }
    }
}

fn print_summary(tracking: &OrderTracking) {
    println!("\nOrden {}: {}% completada", tracking.order_id, tracking.progress);
    println!("Estado actual: {}", tracking.current_status.name);
    println!("Etapa actual: {}", tracking.current_stage.as_deref().unwrap_or("Unknown Stage"));
    println!("\nETAPA                | ESTADO      | COMPLETADOS");
    println!("--------------------------------------------------");
    for s in &tracking.stages {
        println!("{:<20} | {:<11} | {}/{}", s.name, format!("{:?}", s.state), s.completed_count, s.total);
    }
}

fn print_timeline(tracking: &OrderTracking) {
    print_summary(tracking);
    let now = Utc::now();
    for timeline in tracking.timelines.values() {
        println!("\n-- {} ({} eventos) --", timeline.name, timeline.events.len());
        for item in &timeline.items {
            match item {
                TimelineItem::Status(s) => {
                    let mark = if s.is_completed {
                        "[x]"
                    } else if s.is_current {
                        "[>]"
                    } else if s.is_future {
                        "[ ]"
                    } else {
                        "[~]"
                    };
                    println!("{} {:<28} {}", mark, s.status.name, format_exact(s.timestamp));
                }
                TimelineItem::Event(e) => {
                    let latest = tracking.most_recent_event_id == Some(e.event_id);
                    println!("    * {:<24} {} | {} | {}{}",
                             e.event_type.label(),
                             e.description,
                             user_display(e),
                             format_relative(Some(e.created_at), now),
                             if latest { " (último)" } else { "" });
                }
            }
        }
    }
}

fn print_workflow(workflow_type: WorkflowType, definition: &WorkflowDefinition) {
    println!("\n{} ({} estados)", workflow_type, definition.total_statuses());
    for stage in &definition.stages {
        let ids: Vec<&str> = stage.statuses.iter().map(|s| s.id.as_str()).collect();
        println!("  {:<18} {}", stage.name, ids.join(", "));
    }
}
