//! # Vocabulary
//!
//! RDF namespaces and terms used by Web Access Control documents.
//! The namespace table is a compile-time constant shared by every statement
//! builder and by the Turtle writer when choosing prefixes.

/// A namespace prefix and the IRI it abbreviates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    /// Short prefix, without the trailing colon.
    pub prefix: &'static str,
    /// Namespace IRI.
    pub iri: &'static str,
}

impl Namespace {
    /// Expand a local name into a full IRI.
    ///
    /// # Example
    ///
    /// ```
    /// use solid_acl::vocab::ACL;
    ///
    /// assert_eq!(ACL.term("mode"), "http://www.w3.org/ns/auth/acl#mode");
    /// ```
    pub fn term(&self, local: &str) -> String {
        format!("{}{}", self.iri, local)
    }

    /// Strip this namespace from an IRI, returning the local name.
    pub fn local_name<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.iri)
    }
}

/// Web Access Control vocabulary.
pub const ACL: Namespace = Namespace {
    prefix: "acl",
    iri: "http://www.w3.org/ns/auth/acl#",
};

/// Friend-of-a-friend vocabulary (holds the "everyone" class).
pub const FOAF: Namespace = Namespace {
    prefix: "foaf",
    iri: "http://xmlns.com/foaf/0.1/",
};

/// RDF core vocabulary.
pub const RDF: Namespace = Namespace {
    prefix: "rdf",
    iri: "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
};

/// Linked Data Platform vocabulary (container types).
pub const LDP: Namespace = Namespace {
    prefix: "ldp",
    iri: "http://www.w3.org/ns/ldp#",
};

/// XML Schema datatypes.
pub const XSD: Namespace = Namespace {
    prefix: "xsd",
    iri: "http://www.w3.org/2001/XMLSchema#",
};

/// All namespaces known to the Turtle writer, in declaration order.
pub const NAMESPACES: [Namespace; 5] = [ACL, FOAF, RDF, LDP, XSD];

/// `rdf:type`
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// `acl:Authorization`
pub const ACL_AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";
/// `acl:accessTo`
pub const ACL_ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
/// `acl:agent`
pub const ACL_AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
/// `acl:agentClass`
pub const ACL_AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";
/// `acl:mode`
pub const ACL_MODE: &str = "http://www.w3.org/ns/auth/acl#mode";
/// `acl:defaultForNew`, written for inherited authorizations.
pub const ACL_DEFAULT_FOR_NEW: &str = "http://www.w3.org/ns/auth/acl#defaultForNew";
/// `acl:default`, accepted on read.
pub const ACL_DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";
/// `acl:origin`
pub const ACL_ORIGIN: &str = "http://www.w3.org/ns/auth/acl#origin";

/// The class of all agents: grants to this group are public.
pub const EVERYONE: &str = "http://xmlns.com/foaf/0.1/Agent";

/// `ldp:Container`
pub const LDP_CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
/// `ldp:BasicContainer`
pub const LDP_BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";

/// Scheme prefix for secondary e-mail identities.
pub const MAILTO_SCHEME: &str = "mailto:";
