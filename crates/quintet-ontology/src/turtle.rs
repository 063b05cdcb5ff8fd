//! Turtle to graph conversion.

use sophia_api::source::TripleSource;
use sophia_api::term::{Term as RdfTerm, TermKind};
use sophia_api::triple::Triple as RdfTriple;
use sophia_turtle::parser::turtle;

use quintet_graph::{Graph, Literal, NodeId, Term, Triple};

use crate::error::OntologyError;
use crate::terms;

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// Parse a Turtle document into a graph.
///
/// IRIs in the pattern namespace become their local names and `rdf:type`
/// becomes `type`; any other IRI is kept whole.
pub(crate) fn parse(source: &str) -> Result<Graph, OntologyError> {
  let mut graph = Graph::new();
  let mut failure: Option<OntologyError> = None;

  turtle::parse_str(source)
    .for_each_triple(|t| {
      if failure.is_some() {
        return;
      }
      match convert(&t) {
        Ok(triple) => {
          graph.insert(triple);
        }
        Err(e) => failure = Some(e),
      }
    })
    .map_err(|e| OntologyError::Turtle {
      message: e.to_string(),
    })?;

  match failure {
    Some(e) => Err(e),
    None => Ok(graph),
  }
}

fn convert<T: RdfTriple>(t: &T) -> Result<Triple, OntologyError> {
  let subject = node(t.s())?;
  let predicate = node(t.p())?;
  let object = if t.o().kind() == TermKind::Literal {
    Term::Literal(literal(t.o())?)
  } else {
    Term::Node(node(t.o())?)
  };
  Ok(Triple::new(subject, predicate, object))
}

fn node<T: RdfTerm>(term: T) -> Result<NodeId, OntologyError> {
  match term.iri() {
    Some(iri) => Ok(NodeId::from(local_name(iri.as_str()))),
    None => Err(OntologyError::UnsupportedTerm {
      kind: format!("{:?}", term.kind()),
    }),
  }
}

fn local_name(iri: &str) -> &str {
  if iri == RDF_TYPE {
    return terms::TYPE;
  }
  iri.strip_prefix(terms::NAMESPACE).unwrap_or(iri)
}

fn literal<T: RdfTerm>(term: T) -> Result<Literal, OntologyError> {
  let lexical = term
    .lexical_form()
    .map(|l| String::from(&*l))
    .unwrap_or_default();
  let datatype = term
    .datatype()
    .map(|d| d.as_str().to_string())
    .unwrap_or_default();

  let invalid = || OntologyError::InvalidLiteral {
    datatype: datatype.clone(),
    lexical: lexical.clone(),
  };

  match datatype.as_str() {
    XSD_INTEGER => lexical.parse().map(Literal::Integer).map_err(|_| invalid()),
    XSD_BOOLEAN => match lexical.as_str() {
      "true" | "1" => Ok(Literal::Bool(true)),
      "false" | "0" => Ok(Literal::Bool(false)),
      _ => Err(invalid()),
    },
    _ => Ok(Literal::String(lexical)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_typed_literals_and_local_names() {
    let graph = parse(
      r#"
        @prefix pat: <urn:quintet:pattern#> .
        pat:m a pat:PatternMapping ;
          pat:name "Sequence" ;
          pat:count 3 ;
          pat:flag true ;
          pat:other <http://example.org/x> .
      "#,
    )
    .unwrap();

    assert!(graph.contains(&Triple::new("m", "type", Term::node("PatternMapping"))));
    assert_eq!(graph.string("m", "name").unwrap(), Some("Sequence"));
    assert_eq!(graph.integer("m", "count").unwrap(), Some(3));
    assert_eq!(graph.boolean("m", "flag").unwrap(), Some(true));
    assert!(graph.contains(&Triple::new("m", "other", Term::node("http://example.org/x"))));
  }

  #[test]
  fn test_syntax_error() {
    let err = parse("@prefix pat: <urn:quintet:pattern#> . pat:m pat:name").unwrap_err();
    assert!(matches!(err, OntologyError::Turtle { .. }));
  }

  #[test]
  fn test_blank_nodes_rejected() {
    let err = parse("@prefix pat: <urn:quintet:pattern#> . _:b pat:name \"x\" .").unwrap_err();
    assert!(matches!(err, OntologyError::UnsupportedTerm { .. }));
  }
}
