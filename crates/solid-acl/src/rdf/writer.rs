//! Turtle and N-Triples writers.

use std::fmt::Write as _;

use super::{escape_literal, Graph, Term, Triple};
use crate::error::{AclError, AclResult};
use crate::vocab::{NAMESPACES, RDF_TYPE};

/// One canonical line per triple.
///
/// Document-local IRIs (`#fragment`) are resolved against `base`, since
/// N-Triples only carries absolute IRIs.
pub(crate) fn write_ntriples(graph: &Graph, base: Option<&str>) -> AclResult<String> {
    let base = base.map(|b| b.split('#').next().unwrap_or(b));
    let mut out = String::new();
    for triple in graph.iter() {
        let triple = Triple::new(
            absolute(&triple.subject, base)?,
            absolute(&triple.predicate, base)?,
            absolute(&triple.object, base)?,
        );
        out.push_str(&triple.to_canonical_string());
        out.push('\n');
    }
    Ok(out)
}

fn absolute(term: &Term, base: Option<&str>) -> AclResult<Term> {
    match term {
        Term::NamedNode(iri) if iri.starts_with('#') => match base {
            Some(base) => Ok(Term::named(format!("{}{}", base, iri))),
            None => Err(AclError::SerializationError(format!(
                "cannot write <{}> as N-Triples without a base IRI",
                iri
            ))),
        },
        _ => Ok(term.clone()),
    }
}

/// Pretty Turtle, grouped by subject in first-appearance order.
pub(crate) fn write_turtle(graph: &Graph, base: Option<&str>) -> String {
    if graph.is_empty() {
        return String::new();
    }
    let base = base.map(|b| b.split('#').next().unwrap_or(b));
    let mut used = [false; NAMESPACES.len()];

    let mut subjects: Vec<&Term> = Vec::new();
    for triple in graph.iter() {
        if !subjects.contains(&&triple.subject) {
            subjects.push(&triple.subject);
        }
    }

    let mut body = String::new();
    for subject in subjects {
        let triples: Vec<&Triple> = graph.iter().filter(|t| &t.subject == subject).collect();

        let mut predicates: Vec<&Term> = Vec::new();
        for triple in &triples {
            if !predicates.contains(&&triple.predicate) {
                predicates.push(&triple.predicate);
            }
        }

        let _ = writeln!(body, "{}", format_term(subject, base, &mut used));
        for (i, predicate) in predicates.iter().enumerate() {
            let verb = match predicate.as_iri() {
                Some(RDF_TYPE) => "a".to_string(),
                _ => format_term(predicate, base, &mut used),
            };
            let objects: Vec<String> = triples
                .iter()
                .filter(|t| &&t.predicate == predicate)
                .map(|t| format_term(&t.object, base, &mut used))
                .collect();
            let terminator = if i + 1 == predicates.len() { "." } else { ";" };
            let _ = writeln!(body, "    {} {}{}", verb, objects.join(", "), terminator);
        }
        body.push('\n');
    }

    let mut out = String::new();
    for (ns, _) in NAMESPACES.iter().zip(used.iter()).filter(|(_, used)| **used) {
        let _ = writeln!(out, "@prefix {}: <{}>.", ns.prefix, ns.iri);
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&body);
    out
}

fn format_term(term: &Term, base: Option<&str>, used: &mut [bool]) -> String {
    match term {
        Term::NamedNode(iri) => format_iri(iri, base, used),
        Term::BlankNode(label) => format!("_:{}", label),
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            let mut out = format!("\"{}\"", escape_literal(value));
            if let Some(lang) = language {
                out.push('@');
                out.push_str(lang);
            } else if let Some(dt) = datatype {
                out.push_str("^^");
                out.push_str(&format_iri(dt, base, used));
            }
            out
        }
    }
}

fn format_iri(iri: &str, base: Option<&str>, used: &mut [bool]) -> String {
    if iri.starts_with('#') {
        return format!("<{}>", iri);
    }
    if let Some(fragment) = base
        .and_then(|b| iri.strip_prefix(b))
        .filter(|rest| rest.starts_with('#'))
    {
        return format!("<{}>", fragment);
    }
    for (i, ns) in NAMESPACES.iter().enumerate() {
        if let Some(local) = ns.local_name(iri).filter(|l| is_simple_local(l)) {
            used[i] = true;
            return format!("{}:{}", ns.prefix, local);
        }
    }
    format!("<{}>", iri)
}

fn is_simple_local(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{ACL_ACCESS_TO, ACL_AUTHORIZATION, ACL_MODE};

    fn authorization_graph() -> Graph {
        let subject = Term::named("#abc");
        let mut graph = Graph::new();
        graph.add(Triple::new(
            subject.clone(),
            Term::named(RDF_TYPE),
            Term::named(ACL_AUTHORIZATION),
        ));
        graph.add(Triple::new(
            subject.clone(),
            Term::named(ACL_ACCESS_TO),
            Term::named("https://alice.example/file"),
        ));
        graph.add(Triple::new(
            subject.clone(),
            Term::named(ACL_MODE),
            Term::named("http://www.w3.org/ns/auth/acl#Read"),
        ));
        graph.add(Triple::new(
            subject,
            Term::named(ACL_MODE),
            Term::named("http://www.w3.org/ns/auth/acl#Write"),
        ));
        graph
    }

    #[test]
    fn test_write_turtle_layout() {
        let text = write_turtle(&authorization_graph(), None);
        let expected = "@prefix acl: <http://www.w3.org/ns/auth/acl#>.\n\
                        \n\
                        <#abc>\n    \
                        a acl:Authorization;\n    \
                        acl:accessTo <https://alice.example/file>;\n    \
                        acl:mode acl:Read, acl:Write.\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_write_turtle_relativizes_base() {
        let mut graph = Graph::new();
        graph.add(Triple::new(
            Term::named("https://alice.example/file.acl#rule"),
            Term::named(ACL_MODE),
            Term::named("https://alice.example/file.acl#other"),
        ));
        let text = write_turtle(&graph, Some("https://alice.example/file.acl"));
        assert!(text.contains("<#rule>"));
        assert!(text.contains("<#other>"));
    }

    #[test]
    fn test_turtle_output_parses_back() {
        let graph = authorization_graph();
        let text = write_turtle(&graph, None);
        let parsed = Graph::parse(&text, Some("https://alice.example/file.acl"), "text/turtle").unwrap();
        assert_eq!(parsed.len(), graph.len());
        let subject = Term::named("https://alice.example/file.acl#abc");
        assert_eq!(parsed.objects(&subject, ACL_MODE).len(), 2);
    }

    #[test]
    fn test_write_ntriples() {
        let text = write_ntriples(&authorization_graph(), Some("https://alice.example/file.acl")).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().all(|l| l.ends_with(" .")));
        assert!(text
            .lines()
            .all(|l| l.starts_with("<https://alice.example/file.acl#abc> ")));
    }

    #[test]
    fn test_write_ntriples_requires_base_for_local_iris() {
        let err = write_ntriples(&authorization_graph(), None).unwrap_err();
        assert!(matches!(err, AclError::SerializationError(_)));
    }

    #[test]
    fn test_simple_local_names() {
        assert!(is_simple_local("Read"));
        assert!(is_simple_local("default-for_new"));
        assert!(!is_simple_local("1abc"));
        assert!(!is_simple_local("a/b"));
        assert!(!is_simple_local(""));
    }
}
