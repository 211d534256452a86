//! Statement principals
//!
//! A principal is either the bare wildcard `"*"` or an object of named
//! principal lists (`AWS`, `Service`, `Federated`, `CanonicalUser`).

use super::list::StringList;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Named principal lists of a statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecifiedPrincipal {
    #[serde(rename = "AWS", default, skip_serializing_if = "StringList::is_empty")]
    pub aws: StringList,

    #[serde(rename = "Service", default, skip_serializing_if = "StringList::is_empty")]
    pub service: StringList,

    #[serde(rename = "Federated", default, skip_serializing_if = "StringList::is_empty")]
    pub federated: StringList,

    #[serde(
        rename = "CanonicalUser",
        default,
        skip_serializing_if = "StringList::is_empty"
    )]
    pub canonical_user: StringList,
}

impl SpecifiedPrincipal {
    pub fn is_empty(&self) -> bool {
        self.aws.is_empty()
            && self.service.is_empty()
            && self.federated.is_empty()
            && self.canonical_user.is_empty()
    }
}

/// Principal of a policy statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// `"Principal": "*"`
    Wildcard,
    /// `"Principal": {"AWS": ..., "Service": ...}`
    Specified(SpecifiedPrincipal),
}

impl Principal {
    /// Build a principal naming AWS principals only
    pub fn aws<I, S>(principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Principal::Specified(SpecifiedPrincipal {
            aws: principals.into_iter().collect(),
            ..Default::default()
        })
    }

    /// True for `"*"` and for an `AWS` list containing `"*"`
    pub fn is_public(&self) -> bool {
        match self {
            Principal::Wildcard => true,
            Principal::Specified(p) => p.aws.contains("*"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Principal::Wildcard => false,
            Principal::Specified(p) => p.is_empty(),
        }
    }

    /// Named lists, or `None` for the bare wildcard
    pub fn specified(&self) -> Option<&SpecifiedPrincipal> {
        match self {
            Principal::Wildcard => None,
            Principal::Specified(p) => Some(p),
        }
    }

    /// Human readable description used in statement summaries
    pub fn describe(&self) -> String {
        if self.is_public() {
            return "Everyone".to_string();
        }

        let Principal::Specified(p) = self else {
            return "Everyone".to_string();
        };

        let mut parts = Vec::new();
        for (label, list) in [
            ("AWS", &p.aws),
            ("Service", &p.service),
            ("Federated", &p.federated),
            ("CanonicalUser", &p.canonical_user),
        ] {
            if !list.is_empty() {
                parts.push(format!("{}: {}", label, list.as_slice().join(", ")));
            }
        }

        if parts.is_empty() {
            "Nobody".to_string()
        } else {
            parts.join("; ")
        }
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Principal::Wildcard => serializer.serialize_str("*"),
            Principal::Specified(p) => p.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PrincipalVisitor;

        impl<'de> Visitor<'de> for PrincipalVisitor {
            type Value = Principal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"*\" or a principal object")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Principal, E> {
                if v == "*" {
                    Ok(Principal::Wildcard)
                } else {
                    // Not valid AWS syntax, but treat it as the single AWS principal it names
                    Ok(Principal::aws([v]))
                }
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Principal, A::Error> {
                let specified =
                    SpecifiedPrincipal::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(Principal::Specified(specified))
            }
        }

        deserializer.deserialize_any(PrincipalVisitor)
    }
}
