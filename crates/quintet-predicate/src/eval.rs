use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::PredicateError;
use crate::parser::{CompareOp, Expr, Value};

/// Flat case data a predicate is evaluated against.
pub type ContextData = HashMap<String, serde_json::Value>;

impl Expr {
  /// Evaluate to a boolean.
  ///
  /// The whole expression must be boolean: a bare path has to resolve to a
  /// JSON bool and comparisons only accept operands of the same type.
  pub fn evaluate(&self, data: &ContextData) -> Result<bool, PredicateError> {
    match self {
      Expr::Literal(Value::Bool(b)) => Ok(*b),
      Expr::Literal(other) => Err(mismatch(format!(
        "a {} literal is not a condition",
        other.type_name()
      ))),
      Expr::Path(_) => match self.operand(data)? {
        Value::Bool(b) => Ok(b),
        other => Err(mismatch(format!(
          "'{}' is a {}, expected a boolean",
          self.describe(),
          other.type_name()
        ))),
      },
      Expr::Not(inner) => Ok(!inner.evaluate(data)?),
      Expr::And(left, right) => Ok(left.evaluate(data)? && right.evaluate(data)?),
      Expr::Or(left, right) => Ok(left.evaluate(data)? || right.evaluate(data)?),
      Expr::Compare { op, left, right } => {
        let l = left.operand(data)?;
        let r = right.operand(data)?;
        compare(*op, &l, &r)
      }
    }
  }

  fn operand(&self, data: &ContextData) -> Result<Value, PredicateError> {
    match self {
      Expr::Literal(value) => Ok(value.clone()),
      Expr::Path(segments) => lookup(segments, data),
      // A nested boolean expression used as an operand, e.g. `(a and b) == true`.
      other => other.evaluate(data).map(Value::Bool),
    }
  }

  fn describe(&self) -> String {
    match self {
      Expr::Path(segments) => segments.join("."),
      other => format!("{:?}", other),
    }
  }
}

fn mismatch(message: String) -> PredicateError {
  PredicateError::TypeMismatch { message }
}

fn lookup(segments: &[String], data: &ContextData) -> Result<Value, PredicateError> {
  let missing = || PredicateError::MissingVariable {
    name: segments.join("."),
  };

  let (first, rest) = segments.split_first().ok_or_else(missing)?;
  let mut current = data.get(first).ok_or_else(missing)?;
  for segment in rest {
    current = current.get(segment.as_str()).ok_or_else(missing)?;
  }

  match current {
    serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
    serde_json::Value::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| {
      mismatch(format!("'{}' is not representable as a number", segments.join(".")))
    }),
    serde_json::Value::String(s) => Ok(Value::String(s.clone())),
    serde_json::Value::Null => Err(missing()),
    serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(mismatch(format!(
      "'{}' is not a scalar value",
      segments.join(".")
    ))),
  }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, PredicateError> {
  let ordering = match (left, right) {
    (Value::Number(a), Value::Number(b)) => a
      .partial_cmp(b)
      .ok_or_else(|| mismatch("NaN cannot be compared".to_string()))?,
    (Value::String(a), Value::String(b)) => a.cmp(b),
    (Value::Bool(a), Value::Bool(b)) => match op {
      CompareOp::Eq => return Ok(a == b),
      CompareOp::Ne => return Ok(a != b),
      _ => {
        return Err(mismatch(format!(
          "booleans only support == and !=, not {}",
          op
        )));
      }
    },
    (a, b) => {
      return Err(mismatch(format!(
        "cannot compare {} with {}",
        a.type_name(),
        b.type_name()
      )));
    }
  };

  Ok(match op {
    CompareOp::Eq => ordering == Ordering::Equal,
    CompareOp::Ne => ordering != Ordering::Equal,
    CompareOp::Lt => ordering == Ordering::Less,
    CompareOp::Le => ordering != Ordering::Greater,
    CompareOp::Gt => ordering == Ordering::Greater,
    CompareOp::Ge => ordering != Ordering::Less,
  })
}
