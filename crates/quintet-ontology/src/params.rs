//! Closed parameter vocabularies.
//!
//! Every parameter a mapping may carry is drawn from one of these sets. The
//! spelling used in the Turtle dataset is also the serde spelling, so the
//! canonical JSON form of a verb configuration matches the ontology text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OntologyError;

macro_rules! closed_vocabulary {
  ($(#[$meta:meta])* $name:ident: $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub enum $name {
      $(#[serde(rename = $text)] $variant),+
    }

    impl $name {
      pub const ALL: &'static [$name] = &[$($name::$variant),+];

      pub fn as_str(&self) -> &'static str {
        match self {
          $($name::$variant => $text),+
        }
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl FromStr for $name {
      type Err = OntologyError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
          $($text => Ok($name::$variant),)+
          other => Err(OntologyError::UnknownValue {
            parameter: $label,
            value: other.to_string(),
          }),
        }
      }
    }
  };
}

closed_vocabulary! {
  /// The five primitive graph transformations.
  VerbKind: "verb" {
    Transmute => "Transmute",
    Copy => "Copy",
    Filter => "Filter",
    Await => "Await",
    Void => "Void",
  }
}

closed_vocabulary! {
  /// How many targets or instances a Copy activates.
  Cardinality: "cardinality" {
    Topology => "topology",
    Static => "static",
    Dynamic => "dynamic",
    Incremental => "incremental",
    One => "1",
  }
}

closed_vocabulary! {
  /// How spawned instances are named and counted.
  InstanceBinding: "instanceBinding" {
    Index => "index",
    Data => "data",
    Recursive => "recursive",
  }
}

closed_vocabulary! {
  /// What the enclosing case waits for once instances are spawned.
  CompletionStrategy: "completionStrategy" {
    WaitAll => "waitAll",
    WaitQuorum => "waitQuorum",
    WaitFirst => "waitFirst",
    NoSync => "none",
  }
}

closed_vocabulary! {
  /// Which outgoing flows a Filter selects.
  SelectionMode: "selectionMode" {
    ExactlyOne => "exactlyOne",
    OneOrMore => "oneOrMore",
    Deferred => "deferred",
    Mutex => "mutex",
    WhileTrue => "whileTrue",
    UntilTrue => "untilTrue",
    LoopCondition => "loopCondition",
    Authorized => "authorized",
    RoleMatch => "roleMatch",
  }
}

closed_vocabulary! {
  /// The node set a Void cancels.
  CancellationScope: "cancellationScope" {
    SelfTask => "self",
    Task => "task",
    Region => "region",
    Instances => "instances",
    Case => "case",
  }
}

/// Await threshold as written in the ontology.
///
/// `Static` and `Dynamic` are quorums whose size is only known per task
/// (`quorum` property) or per firing (case data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ThresholdSpec {
  All,
  Active,
  Static,
  Dynamic,
  AtLeast(u32),
}

impl ThresholdSpec {
  /// Whether the join may fire before every source has completed.
  pub fn is_partial(&self) -> bool {
    !matches!(self, ThresholdSpec::All | ThresholdSpec::Active)
  }
}

impl fmt::Display for ThresholdSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ThresholdSpec::All => f.write_str("all"),
      ThresholdSpec::Active => f.write_str("active"),
      ThresholdSpec::Static => f.write_str("static"),
      ThresholdSpec::Dynamic => f.write_str("dynamic"),
      ThresholdSpec::AtLeast(n) => write!(f, "{}", n),
    }
  }
}

impl FromStr for ThresholdSpec {
  type Err = OntologyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "all" => Ok(ThresholdSpec::All),
      "active" => Ok(ThresholdSpec::Active),
      "static" => Ok(ThresholdSpec::Static),
      "dynamic" => Ok(ThresholdSpec::Dynamic),
      other => match other.parse::<u32>() {
        Ok(n) if n > 0 => Ok(ThresholdSpec::AtLeast(n)),
        _ => Err(OntologyError::UnknownValue {
          parameter: "threshold",
          value: other.to_string(),
        }),
      },
    }
  }
}

impl TryFrom<String> for ThresholdSpec {
  type Error = OntologyError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<ThresholdSpec> for String {
  fn from(value: ThresholdSpec) -> Self {
    value.to_string()
  }
}
