// Archivo: workflow.rs
// Propósito: catálogo ordenado de etapas y estados de un tipo de workflow.
// La definición llega desde el backend (o del catálogo embebido) y es
// inmutable durante una pasada de reconciliación.
use crate::{DomainError, Stage, WorkflowType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identificador opaco de estado (p. ej. `"QUOTE_SENT"`).
pub type StatusId = String;

/// Estado fino del workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusDescriptor {
  pub id: StatusId,
  pub name: String,
}

impl StatusDescriptor {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self { id: id.into(), name: name.into() }
  }
}

/// Etapa del catálogo con sus estados en orden de workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
  pub id: Stage,
  pub name: String,
  #[serde(default)]
  pub statuses: Vec<StatusDescriptor>,
}

impl StageDescriptor {
  pub fn new(id: Stage, name: impl Into<String>, statuses: Vec<StatusDescriptor>) -> Self {
    Self { id, name: name.into(), statuses }
  }

  pub fn contains(&self, status_id: &str) -> bool {
    self.statuses.iter().any(|s| s.id == status_id)
  }
}

/// Definición completa de un workflow: secuencia ordenada de etapas, cada
/// una con su secuencia ordenada de estados.
///
/// Acepta la forma de `GET /workflow/full-workflow/{type}`; los campos
/// extra de la respuesta (`total_stages`, ...) se ignoran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
  #[serde(default)]
  pub workflow_type: Option<WorkflowType>,
  pub stages: Vec<StageDescriptor>,
}

impl WorkflowDefinition {
  /// Construye y valida una definición.
  pub fn new(workflow_type: Option<WorkflowType>, stages: Vec<StageDescriptor>) -> Result<Self, DomainError> {
    let def = Self { workflow_type, stages };
    def.validate()?;
    Ok(def)
  }

  /// Deserializa y valida una definición desde JSON.
  pub fn from_json(raw: &str) -> Result<Self, DomainError> {
    let def: WorkflowDefinition = serde_json::from_str(raw)?;
    def.validate()?;
    Ok(def)
  }

  /// Una definición necesita al menos una etapa y no puede repetir ids de
  /// etapa.
  pub fn validate(&self) -> Result<(), DomainError> {
    if self.stages.is_empty() {
      return Err(DomainError::ValidationError("La definición de workflow no tiene etapas".to_string()));
    }
    let mut seen = HashSet::new();
    for stage in &self.stages {
      if !seen.insert(stage.id) {
        return Err(DomainError::ValidationError(format!("Etapa duplicada en la definición: {}", stage.id)));
      }
    }
    Ok(())
  }

  pub fn first_stage(&self) -> Option<&StageDescriptor> {
    self.stages.first()
  }

  pub fn stage(&self, stage: Stage) -> Option<&StageDescriptor> {
    self.stages.iter().find(|s| s.id == stage)
  }

  pub fn has_stage(&self, stage: Stage) -> bool {
    self.stage(stage).is_some()
  }

  /// Todos los estados aplanados en orden de workflow.
  pub fn all_statuses(&self) -> Vec<&StatusDescriptor> {
    self.stages.iter().flat_map(|s| s.statuses.iter()).collect()
  }

  pub fn total_statuses(&self) -> usize {
    self.stages.iter().map(|s| s.statuses.len()).sum()
  }

  pub fn find_status(&self, status_id: &str) -> Option<&StatusDescriptor> {
    self.stages.iter().flat_map(|s| s.statuses.iter()).find(|s| s.id == status_id)
  }

  /// Etapa que declara el estado. La primera gana si el catálogo repite ids.
  pub fn stage_for_status(&self, status_id: &str) -> Option<&StageDescriptor> {
    self.stages.iter().find(|s| s.contains(status_id))
  }

  /// Posición del estado en el orden aplanado del workflow.
  pub fn status_index(&self, status_id: &str) -> Option<usize> {
    self.stages.iter().flat_map(|s| s.statuses.iter()).position(|s| s.id == status_id)
  }

  /// Estado siguiente a `current` considerando sólo las etapas
  /// seleccionadas. `None` si `current` es el último o no pertenece a la
  /// selección.
  pub fn next_status(&self, current: &str, selected_stages: &[Stage]) -> Option<&StatusDescriptor> {
    let selected: Vec<&StatusDescriptor> = self.stages
                                               .iter()
                                               .filter(|s| selected_stages.contains(&s.id))
                                               .flat_map(|s| s.statuses.iter())
                                               .collect();
    let idx = selected.iter().position(|s| s.id == current)?;
    selected.get(idx + 1).copied()
  }

  /// Atajo de `next_status` sobre todas las etapas de la definición.
  pub fn next_status_in_workflow(&self, current: &str) -> Option<&StatusDescriptor> {
    let all: Vec<Stage> = self.stages.iter().map(|s| s.id).collect();
    self.next_status(current, &all)
  }
}
