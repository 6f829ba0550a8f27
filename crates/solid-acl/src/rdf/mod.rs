//! # RDF Graph
//!
//! A small in-memory triple store with a Turtle / N-Triples codec, sized for
//! ACL documents. Terms are kept as plain strings; relative IRIs are resolved
//! against the document base when text is parsed.
//!
//! ```
//! use solid_acl::rdf::{Graph, RdfFormat, Term};
//!
//! let text = "@prefix acl: <http://www.w3.org/ns/auth/acl#>.\n\
//!             <#owner> acl:mode acl:Read.";
//! let graph = Graph::parse(text, Some("https://alice.example/doc.acl"), "text/turtle").unwrap();
//!
//! let subject = Term::named("https://alice.example/doc.acl#owner");
//! assert_eq!(graph.statements_matching(Some(&subject), None, None).len(), 1);
//!
//! let ntriples = graph.serialize(RdfFormat::NTriples, None).unwrap();
//! assert!(ntriples.contains("<http://www.w3.org/ns/auth/acl#Read>"));
//! ```

mod parser;
mod writer;

use std::fmt;

use crate::error::{AclError, AclResult};

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// An IRI. Relative IRIs are only kept when no base was available.
    NamedNode(String),
    /// A blank node, identified by its document-local label.
    BlankNode(String),
    /// A literal value with optional datatype IRI or language tag.
    Literal {
        /// Lexical form.
        value: String,
        /// Datatype IRI, if any.
        datatype: Option<String>,
        /// Language tag, if any.
        language: Option<String>,
    },
}

impl Term {
    /// Create a named node.
    pub fn named(iri: impl Into<String>) -> Self {
        Term::NamedNode(iri.into())
    }

    /// Create a blank node.
    pub fn blank(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    /// Create a plain string literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a typed literal.
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// The IRI of a named node.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::NamedNode(iri) => Some(iri),
            _ => None,
        }
    }

    /// The IRI, label or lexical form of the term.
    pub fn value(&self) -> &str {
        match self {
            Term::NamedNode(iri) => iri,
            Term::BlankNode(label) => label,
            Term::Literal { value, .. } => value,
        }
    }

    /// Check if the term is a named node.
    pub fn is_named_node(&self) -> bool {
        matches!(self, Term::NamedNode(_))
    }
}

impl fmt::Display for Term {
    /// N-Triples form of the term.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A single RDF statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// Statement subject.
    pub subject: Term,
    /// Statement predicate.
    pub predicate: Term,
    /// Statement object.
    pub object: Term,
}

impl Triple {
    /// Create a new triple.
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The triple as one N-Triples line, e.g. `<s> <p> <o> .`.
    pub fn to_canonical_string(&self) -> String {
        format!("{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Textual RDF formats understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    /// Turtle (`text/turtle`).
    Turtle,
    /// N-Triples (`application/n-triples`).
    NTriples,
}

impl RdfFormat {
    /// Media type sent in `Content-Type` headers.
    pub fn content_type(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
        }
    }

    /// Detect a format from a media type, ignoring parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use solid_acl::rdf::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::from_content_type("text/turtle; charset=utf-8"), Some(RdfFormat::Turtle));
    /// assert_eq!(RdfFormat::from_content_type("application/ld+json"), None);
    /// ```
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match media.as_str() {
            "text/turtle" | "application/x-turtle" => Some(RdfFormat::Turtle),
            "application/n-triples" => Some(RdfFormat::NTriples),
            _ => None,
        }
    }
}

/// An RDF graph: a set of triples kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            triples: Vec::new(),
        }
    }

    /// Parse RDF text into a graph.
    ///
    /// # Arguments
    ///
    /// * `text` - Document body
    /// * `base_uri` - Base for resolving relative IRIs, usually the document URL
    /// * `content_type` - Media type of the document
    ///
    /// # Returns
    ///
    /// The parsed graph, or `SerializationError` for syntax errors and
    /// unsupported media types
    pub fn parse(text: &str, base_uri: Option<&str>, content_type: &str) -> AclResult<Self> {
        match RdfFormat::from_content_type(content_type) {
            // N-Triples is a syntactic subset of Turtle
            Some(RdfFormat::Turtle) | Some(RdfFormat::NTriples) => parser::parse(text, base_uri),
            None => Err(AclError::SerializationError(format!(
                "unsupported content type: {}",
                content_type
            ))),
        }
    }

    /// Serialize the graph to text.
    ///
    /// IRIs in the `base_uri` document are written relative to it in Turtle.
    /// N-Triples output resolves document-local IRIs against `base_uri`
    /// instead, and fails without one.
    pub fn serialize(&self, format: RdfFormat, base_uri: Option<&str>) -> AclResult<String> {
        let text = match format {
            RdfFormat::Turtle => writer::write_turtle(self, base_uri),
            RdfFormat::NTriples => writer::write_ntriples(self, base_uri)?,
        };
        if text.trim().is_empty() {
            return Err(AclError::SerializationError(
                "writer produced no output".to_string(),
            ));
        }
        Ok(text)
    }

    /// Add a triple. Duplicates are ignored.
    pub fn add(&mut self, triple: Triple) {
        if !self.triples.contains(&triple) {
            self.triples.push(triple);
        }
    }

    /// Add every triple from an iterator.
    pub fn add_all<I>(&mut self, triples: I)
    where
        I: IntoIterator<Item = Triple>,
    {
        for triple in triples {
            self.add(triple);
        }
    }

    /// Find statements matching a pattern; `None` matches anything.
    pub fn statements_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Term>,
        object: Option<&Term>,
    ) -> Vec<&Triple> {
        self.triples
            .iter()
            .filter(|t| subject.map_or(true, |s| &t.subject == s))
            .filter(|t| predicate.map_or(true, |p| &t.predicate == p))
            .filter(|t| object.map_or(true, |o| &t.object == o))
            .collect()
    }

    /// Objects of every `(subject, predicate, ?)` statement.
    pub fn objects(&self, subject: &Term, predicate: &str) -> Vec<&Term> {
        let predicate = Term::named(predicate);
        self.statements_matching(Some(subject), Some(&predicate), None)
            .into_iter()
            .map(|t| &t.object)
            .collect()
    }

    /// Subjects declared with `rdf:type <type_iri>`, without duplicates.
    pub fn subjects_of_type(&self, type_iri: &str) -> Vec<&Term> {
        let predicate = Term::named(crate::vocab::RDF_TYPE);
        let object = Term::named(type_iri);
        let mut subjects: Vec<&Term> = Vec::new();
        for triple in self.statements_matching(None, Some(&predicate), Some(&object)) {
            if !subjects.contains(&&triple.subject) {
                subjects.push(&triple.subject);
            }
        }
        subjects
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over the triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        graph.add_all(iter);
        graph
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

/// Escape a literal's lexical form for a double-quoted string.
pub(crate) fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
