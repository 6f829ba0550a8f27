//! Turtle reader.
//!
//! Covers the parts of Turtle that ACL documents use: prefix and base
//! directives, IRIs, prefixed names, `a`, predicate and object lists, blank
//! nodes, literals and bare numbers / booleans. Collections are rejected.

use std::collections::HashMap;

use url::Url;

use super::{Graph, Term, Triple};
use crate::error::{AclError, AclResult};
use crate::vocab::{RDF_TYPE, XSD};

/// Parse Turtle (or N-Triples) text into a graph.
pub(crate) fn parse(text: &str, base: Option<&str>) -> AclResult<Graph> {
    let base = match base {
        Some(b) => Some(Url::parse(b).map_err(|e| {
            AclError::SerializationError(format!("invalid base IRI <{}>: {}", b, e))
        })?),
        None => None,
    };
    let mut parser = TurtleParser {
        chars: text.chars().collect(),
        pos: 0,
        base,
        prefixes: HashMap::new(),
        anonymous: 0,
        graph: Graph::new(),
    };
    parser.parse_document()?;
    Ok(parser.graph)
}

struct TurtleParser {
    chars: Vec<char>,
    pos: usize,
    base: Option<Url>,
    prefixes: HashMap<String, String>,
    anonymous: usize,
    graph: Graph,
}

impl TurtleParser {
    fn parse_document(&mut self) -> AclResult<()> {
        loop {
            self.skip_ws();
            if self.peek().is_none() {
                return Ok(());
            }
            self.parse_statement()?;
        }
    }

    fn parse_statement(&mut self) -> AclResult<()> {
        if self.peek() == Some('@') {
            self.pos += 1;
            let directive = self.read_while(|c| c.is_ascii_alphabetic());
            match directive.as_str() {
                "prefix" => self.parse_prefix_decl()?,
                "base" => self.parse_base_decl()?,
                other => return Err(self.error(&format!("unknown directive @{}", other))),
            }
            return self.expect('.');
        }
        if self.at_keyword("PREFIX") {
            self.pos += "PREFIX".len();
            return self.parse_prefix_decl();
        }
        if self.at_keyword("BASE") {
            self.pos += "BASE".len();
            return self.parse_base_decl();
        }

        self.parse_triples()?;
        self.expect('.')
    }

    fn parse_prefix_decl(&mut self) -> AclResult<()> {
        self.skip_ws();
        let prefix = self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
        self.expect(':')?;
        self.skip_ws();
        let iri = self.parse_iri_ref()?;
        self.prefixes.insert(prefix, iri);
        Ok(())
    }

    fn parse_base_decl(&mut self) -> AclResult<()> {
        self.skip_ws();
        let iri = self.parse_iri_ref()?;
        let base = Url::parse(&iri).map_err(|e| self.error(&format!("invalid base <{}>: {}", iri, e)))?;
        self.base = Some(base);
        Ok(())
    }

    fn parse_triples(&mut self) -> AclResult<()> {
        self.skip_ws();
        if self.peek() == Some('[') {
            let node = self.parse_blank_property_list()?;
            self.skip_ws();
            // `[ ... ] .` may stand alone
            if self.peek() != Some('.') {
                self.parse_predicate_object_list(&node)?;
            }
            return Ok(());
        }

        let subject = match self.peek() {
            Some('<') => Term::NamedNode(self.parse_iri_ref()?),
            Some('_') => self.parse_blank_label()?,
            _ => Term::NamedNode(self.parse_prefixed_name()?),
        };
        self.parse_predicate_object_list(&subject)
    }

    fn parse_predicate_object_list(&mut self, subject: &Term) -> AclResult<()> {
        loop {
            let predicate = self.parse_verb()?;
            self.parse_object_list(subject, &predicate)?;
            self.skip_ws();
            if self.peek() != Some(';') {
                return Ok(());
            }
            while self.peek() == Some(';') {
                self.pos += 1;
                self.skip_ws();
            }
            // A trailing `;` before the terminator is allowed
            if matches!(self.peek(), None | Some('.') | Some(']')) {
                return Ok(());
            }
        }
    }

    fn parse_object_list(&mut self, subject: &Term, predicate: &Term) -> AclResult<()> {
        loop {
            let object = self.parse_object()?;
            self.graph
                .add(Triple::new(subject.clone(), predicate.clone(), object));
            self.skip_ws();
            if self.peek() != Some(',') {
                return Ok(());
            }
            self.pos += 1;
        }
    }

    fn parse_verb(&mut self) -> AclResult<Term> {
        self.skip_ws();
        if self.peek() == Some('a')
            && self
                .peek_at(1)
                .map_or(false, |c| c.is_whitespace() || c == '<' || c == '[')
        {
            self.pos += 1;
            return Ok(Term::named(RDF_TYPE));
        }
        match self.peek() {
            Some('<') => Ok(Term::NamedNode(self.parse_iri_ref()?)),
            _ => Ok(Term::NamedNode(self.parse_prefixed_name()?)),
        }
    }

    fn parse_object(&mut self) -> AclResult<Term> {
        self.skip_ws();
        match self.peek() {
            Some('<') => Ok(Term::NamedNode(self.parse_iri_ref()?)),
            Some('_') => self.parse_blank_label(),
            Some('[') => self.parse_blank_property_list(),
            Some('"') | Some('\'') => self.parse_literal(),
            Some('(') => Err(self.error("RDF collections are not supported")),
            Some(c) if c.is_ascii_digit() || c == '+' || c == '-' => self.parse_number(),
            Some(_) if self.at_boolean("true") => {
                self.pos += 4;
                Ok(Term::typed_literal("true", XSD.term("boolean")))
            }
            Some(_) if self.at_boolean("false") => {
                self.pos += 5;
                Ok(Term::typed_literal("false", XSD.term("boolean")))
            }
            Some(_) => Ok(Term::NamedNode(self.parse_prefixed_name()?)),
            None => Err(self.error("expected object, found end of input")),
        }
    }

    fn parse_iri_ref(&mut self) -> AclResult<String> {
        self.expect('<')?;
        let raw = self.read_while(|c| c != '>' && c != '\n');
        if self.peek() != Some('>') {
            return Err(self.error("unterminated IRI"));
        }
        self.pos += 1;
        self.resolve(&raw)
    }

    fn resolve(&self, raw: &str) -> AclResult<String> {
        match Url::parse(raw) {
            // Absolute IRIs are kept verbatim so they compare equal to the input
            Ok(_) => Ok(raw.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => base
                    .join(raw)
                    .map(|u| u.to_string())
                    .map_err(|e| self.error(&format!("cannot resolve <{}>: {}", raw, e))),
                None => Ok(raw.to_string()),
            },
            Err(e) => Err(self.error(&format!("invalid IRI <{}>: {}", raw, e))),
        }
    }

    fn parse_prefixed_name(&mut self) -> AclResult<String> {
        let start = self.pos;
        let mut name = self.read_while(|c| c.is_alphanumeric() || "_-.:%".contains(c));
        // A trailing dot terminates the statement
        while name.ends_with('.') {
            name.pop();
            self.pos -= 1;
        }
        let Some((prefix, local)) = name.split_once(':') else {
            self.pos = start;
            return Err(self.error(&format!("unexpected token '{}'", name)));
        };
        match self.prefixes.get(prefix) {
            Some(ns) => Ok(format!("{}{}", ns, local)),
            None => {
                self.pos = start;
                Err(self.error(&format!("undefined prefix '{}:'", prefix)))
            }
        }
    }

    fn parse_blank_label(&mut self) -> AclResult<Term> {
        if self.peek_at(1) != Some(':') {
            return Err(self.error("expected blank node label"));
        }
        self.pos += 2;
        let mut label = self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
        while label.ends_with('.') {
            label.pop();
            self.pos -= 1;
        }
        if label.is_empty() {
            return Err(self.error("empty blank node label"));
        }
        Ok(Term::BlankNode(label))
    }

    fn parse_blank_property_list(&mut self) -> AclResult<Term> {
        self.expect('[')?;
        self.anonymous += 1;
        let node = Term::BlankNode(format!("genid{}", self.anonymous));
        self.skip_ws();
        if self.peek() != Some(']') {
            self.parse_predicate_object_list(&node)?;
        }
        self.expect(']')?;
        Ok(node)
    }

    fn parse_literal(&mut self) -> AclResult<Term> {
        let quote = self.peek().unwrap_or('"');
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if long { 3 } else { 1 };

        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated string literal"));
            };
            if c == quote {
                if !long {
                    self.pos += 1;
                    break;
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.pos += 3;
                    break;
                }
            }
            if c == '\n' && !long {
                return Err(self.error("newline in string literal"));
            }
            self.pos += 1;
            if c == '\\' {
                value.push(self.parse_escape()?);
            } else {
                value.push(c);
            }
        }

        if self.peek() == Some('@') {
            self.pos += 1;
            let language = self.read_while(|c| c.is_ascii_alphanumeric() || c == '-');
            if language.is_empty() {
                return Err(self.error("empty language tag"));
            }
            return Ok(Term::Literal {
                value,
                datatype: None,
                language: Some(language),
            });
        }
        if self.peek() == Some('^') && self.peek_at(1) == Some('^') {
            self.pos += 2;
            let datatype = match self.peek() {
                Some('<') => self.parse_iri_ref()?,
                _ => self.parse_prefixed_name()?,
            };
            return Ok(Term::typed_literal(value, datatype));
        }
        Ok(Term::literal(value))
    }

    fn parse_escape(&mut self) -> AclResult<char> {
        let Some(c) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;
        match c {
            't' => Ok('\t'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            'b' => Ok('\u{8}'),
            'f' => Ok('\u{c}'),
            '"' | '\'' | '\\' => Ok(c),
            'u' => self.parse_unicode_escape(4),
            'U' => self.parse_unicode_escape(8),
            other => Err(self.error(&format!("invalid escape \\{}", other))),
        }
    }

    fn parse_unicode_escape(&mut self, len: usize) -> AclResult<char> {
        if self.pos + len > self.chars.len() {
            return Err(self.error("truncated unicode escape"));
        }
        let hex: String = self.chars[self.pos..self.pos + len].iter().collect();
        self.pos += len;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(&format!("invalid unicode escape {}", hex)))
    }

    fn parse_number(&mut self) -> AclResult<Term> {
        let mut lexical = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            lexical.push(sign);
            self.pos += 1;
        }
        lexical.push_str(&self.read_while(|c| c.is_ascii_digit()));
        let mut datatype = "integer";
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            self.pos += 1;
            lexical.push('.');
            lexical.push_str(&self.read_while(|c| c.is_ascii_digit()));
            datatype = "decimal";
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            lexical.push('e');
            self.pos += 1;
            if let Some(sign @ ('+' | '-')) = self.peek() {
                lexical.push(sign);
                self.pos += 1;
            }
            lexical.push_str(&self.read_while(|c| c.is_ascii_digit()));
            datatype = "double";
        }
        if !lexical.chars().any(|c| c.is_ascii_digit()) {
            return Err(self.error("malformed number"));
        }
        Ok(Term::typed_literal(lexical, XSD.term(datatype)))
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> AclResult<()> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(&format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(&format!("expected '{}', found end of input", expected))),
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        let len = keyword.len();
        if self.pos + len > self.chars.len() {
            return false;
        }
        let word: String = self.chars[self.pos..self.pos + len].iter().collect();
        word.eq_ignore_ascii_case(keyword) && self.peek_at(len).map_or(false, |c| c.is_whitespace())
    }

    fn at_boolean(&self, word: &str) -> bool {
        let len = word.len();
        if self.pos + len > self.chars.len() {
            return false;
        }
        let found: String = self.chars[self.pos..self.pos + len].iter().collect();
        found == word
            && self
                .peek_at(len)
                .map_or(true, |c| !(c.is_alphanumeric() || c == ':' || c == '_' || c == '-'))
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn error(&self, message: &str) -> AclError {
        let line = self.chars[..self.pos.min(self.chars.len())]
            .iter()
            .filter(|&&c| c == '\n')
            .count()
            + 1;
        AclError::SerializationError(format!("line {}: {}", line, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{ACL_AGENT, ACL_MODE};

    const BASE: &str = "https://alice.example/docs/file.acl";

    #[test]
    fn test_parse_prefixes_and_lists() {
        let text = r#"
            @prefix acl: <http://www.w3.org/ns/auth/acl#>.
            @prefix foaf: <http://xmlns.com/foaf/0.1/>.

            # owner rule
            <#owner>
                a acl:Authorization;
                acl:agent <https://alice.example/profile#me>, <mailto:alice@example.com>;
                acl:accessTo <./file>;
                acl:mode acl:Read, acl:Write, acl:Control.
        "#;
        let graph = parse(text, Some(BASE)).unwrap();
        assert_eq!(graph.len(), 7);

        let subject = Term::named("https://alice.example/docs/file.acl#owner");
        assert_eq!(graph.objects(&subject, ACL_AGENT).len(), 2);
        assert_eq!(graph.objects(&subject, ACL_MODE).len(), 3);
        assert_eq!(
            graph.objects(&subject, "http://www.w3.org/ns/auth/acl#accessTo"),
            vec![&Term::named("https://alice.example/docs/file")]
        );
    }

    #[test]
    fn test_parse_sparql_style_directives() {
        let text = "PREFIX acl: <http://www.w3.org/ns/auth/acl#>\n\
                    BASE <https://bob.example/>\n\
                    <#r> acl:mode acl:Append .";
        let graph = parse(text, None).unwrap();
        let subject = Term::named("https://bob.example/#r");
        assert_eq!(graph.objects(&subject, ACL_MODE).len(), 1);
    }

    #[test]
    fn test_parse_ntriples() {
        let text = "<https://a.example/s> <https://a.example/p> \"v\\n1\"@en .\n\
                    <https://a.example/s> <https://a.example/p> \"5\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n\
                    _:b1 <https://a.example/p> <https://a.example/o> .\n";
        let graph = parse(text, None).unwrap();
        assert_eq!(graph.len(), 3);
        let literals: Vec<_> = graph.iter().map(|t| t.object.value().to_string()).collect();
        assert_eq!(literals[0], "v\n1");
        assert_eq!(literals[1], "5");
    }

    #[test]
    fn test_parse_blank_nodes_and_literals() {
        let text = r#"
            @prefix ex: <https://ex.example/ns#>.
            [ ex:name "anon" ] ex:count 42; ex:ratio 1.5; ex:flag true.
            ex:s ex:nested [ ex:value 'single' ], """long
text""".
        "#;
        let graph = parse(text, None).unwrap();
        assert_eq!(graph.len(), 7);
        let flag = Term::named("https://ex.example/ns#flag");
        let found = graph.statements_matching(None, Some(&flag), None);
        assert_eq!(found[0].object, Term::typed_literal("true", XSD.term("boolean")));
    }

    #[test]
    fn test_absolute_iris_kept_verbatim() {
        let text = "<https://example.org> <https://example.org/p> <https://example.org/o> .";
        let graph = parse(text, Some(BASE)).unwrap();
        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.subject, Term::named("https://example.org"));
    }

    #[test]
    fn test_syntax_errors_report_line() {
        let err = parse("<#a> <#b> <#c> .\n<#d> <#e>", Some(BASE)).unwrap_err();
        match err {
            AclError::SerializationError(msg) => assert!(msg.starts_with("line 2"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_undefined_prefix() {
        let err = parse("<#a> acl:mode acl:Read .", Some(BASE)).unwrap_err();
        assert!(err.to_string().contains("undefined prefix 'acl:'"));
    }

    #[test]
    fn test_collections_rejected() {
        let err = parse("<#a> <#b> ( <#c> ) .", Some(BASE)).unwrap_err();
        assert!(err.to_string().contains("collections"));
    }
}
