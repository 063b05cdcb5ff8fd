use serde::Serialize;

use quintet_graph::Literal;

use crate::error::OntologyError;
use crate::params::{
  CancellationScope, Cardinality, CompletionStrategy, InstanceBinding, SelectionMode,
  ThresholdSpec, VerbKind,
};
use crate::terms;

/// Optional policy parameters attached to a pattern mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingParams {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub threshold: Option<ThresholdSpec>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cardinality: Option<Cardinality>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub completion_strategy: Option<CompletionStrategy>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub selection_mode: Option<SelectionMode>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cancellation_scope: Option<CancellationScope>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reset_on_fire: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub instance_binding: Option<InstanceBinding>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trigger_property: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub trigger_value: Option<Literal>,
}

impl MappingParams {
  /// Ontology names of the parameters that are set.
  pub fn present(&self) -> Vec<&'static str> {
    let mut names = Vec::new();
    if self.threshold.is_some() {
      names.push(terms::THRESHOLD);
    }
    if self.cardinality.is_some() {
      names.push(terms::CARDINALITY);
    }
    if self.completion_strategy.is_some() {
      names.push(terms::COMPLETION_STRATEGY);
    }
    if self.selection_mode.is_some() {
      names.push(terms::SELECTION_MODE);
    }
    if self.cancellation_scope.is_some() {
      names.push(terms::CANCELLATION_SCOPE);
    }
    if self.reset_on_fire.is_some() {
      names.push(terms::RESET_ON_FIRE);
    }
    if self.instance_binding.is_some() {
      names.push(terms::INSTANCE_BINDING);
    }
    if self.trigger_property.is_some() {
      names.push(terms::TRIGGER_PROPERTY);
    }
    if self.trigger_value.is_some() {
      names.push(terms::TRIGGER_VALUE);
    }
    names
  }
}

/// A pattern name bound to one verb and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMapping {
  pub name: String,
  pub verb: VerbKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub structural_key: Option<String>,
  pub params: MappingParams,
}

/// Parameters each verb accepts, and which of them must be present.
fn parameter_rules(verb: VerbKind) -> (&'static [&'static str], &'static [&'static str]) {
  match verb {
    VerbKind::Transmute => (&[], &[]),
    VerbKind::Copy => (
      &[
        terms::CARDINALITY,
        terms::INSTANCE_BINDING,
        terms::COMPLETION_STRATEGY,
      ],
      &[terms::CARDINALITY],
    ),
    VerbKind::Filter => (&[terms::SELECTION_MODE], &[terms::SELECTION_MODE]),
    VerbKind::Await => (
      &[
        terms::THRESHOLD,
        terms::RESET_ON_FIRE,
        terms::TRIGGER_PROPERTY,
        terms::TRIGGER_VALUE,
      ],
      &[terms::THRESHOLD],
    ),
    VerbKind::Void => (&[terms::CANCELLATION_SCOPE], &[terms::CANCELLATION_SCOPE]),
  }
}

impl PatternMapping {
  /// Check the parameter combination against the verb.
  pub fn validate(&self) -> Result<(), OntologyError> {
    let invalid = |reason: String| OntologyError::InvalidMapping {
      mapping: self.name.clone(),
      reason,
    };

    let (allowed, required) = parameter_rules(self.verb);
    let present = self.params.present();

    if let Some(extra) = present.iter().find(|p| !allowed.contains(*p)) {
      return Err(invalid(format!(
        "parameter '{}' is not valid for verb {}",
        extra, self.verb
      )));
    }
    if let Some(missing) = required.iter().find(|r| !present.contains(*r)) {
      return Err(invalid(format!(
        "verb {} requires parameter '{}'",
        self.verb, missing
      )));
    }

    if self.params.trigger_value.is_some() && self.params.trigger_property.is_none() {
      return Err(invalid("triggerValue without triggerProperty".to_string()));
    }

    match (self.params.cardinality, self.params.instance_binding) {
      (Some(Cardinality::Topology), Some(binding)) => {
        return Err(invalid(format!(
          "topology cardinality cannot bind instances by '{}'",
          binding
        )));
      }
      (Some(cardinality), None) if cardinality != Cardinality::Topology => {
        return Err(invalid(format!(
          "cardinality '{}' needs an instanceBinding",
          cardinality
        )));
      }
      _ => {}
    }

    Ok(())
  }
}
