use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{RefTarget, Reference};

/// Key of the reference marker inside a mapping.
pub const REF_KEY: &str = "$ref";

/// Ordered string-keyed mapping, the container of every document section.
pub type Mapping = IndexMap<String, Node>;

/// A node of a parsed document tree.
///
/// The set of variants is closed: every traversal in the crate matches on it
/// exhaustively instead of probing values at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An ordered mapping.
    Mapping(Mapping),
    /// A sequence.
    Sequence(Vec<Node>),
    /// A leaf value.
    Scalar(Scalar),
    /// A `$ref` marker, recognized while parsing.
    Reference(Reference),
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `null` or `~`.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
}

impl Node {
    /// Creates an empty mapping node.
    #[must_use]
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// Creates a string scalar node.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    /// Returns the mapping if this node is one.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the mapping mutably if this node is one.
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the items if this node is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string if this node is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the reference if this node is one.
    #[must_use]
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Looks a key up when this node is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|mapping| mapping.get(key))
    }

    /// Looks a key up mutably when this node is a mapping.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.as_mapping_mut().and_then(|mapping| mapping.get_mut(key))
    }

    /// Follows a JSON pointer (without `#`), unescaping `~1` and `~0`.
    ///
    /// The empty pointer designates the node itself.
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Node> {
        pointer
            .split('/')
            .skip(1)
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .try_fold(self, |current, token| current.get(&token))
    }

    /// `true` for null, empty mappings and empty sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(Scalar::Null) => true,
            Self::Mapping(mapping) => mapping.is_empty(),
            Self::Sequence(items) => items.is_empty(),
            Self::Scalar(_) | Self::Reference(_) => false,
        }
    }

    /// Calls `visit` on every reference of this subtree, depth first, in document order.
    ///
    /// Siblings of a reference are visited too.
    pub fn visit_references<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Reference),
    {
        match self {
            Self::Mapping(mapping) => {
                for value in mapping.values() {
                    value.visit_references(visit);
                }
            }
            Self::Sequence(items) => {
                for item in items {
                    item.visit_references(visit);
                }
            }
            Self::Reference(reference) => {
                visit(reference);
                for value in reference.siblings.values() {
                    value.visit_references(visit);
                }
            }
            Self::Scalar(_) => {}
        }
    }

    /// Mutable counterpart of [`Node::visit_references`].
    pub fn visit_references_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut Reference),
    {
        match self {
            Self::Mapping(mapping) => {
                for value in mapping.values_mut() {
                    value.visit_references_mut(visit);
                }
            }
            Self::Sequence(items) => {
                for item in items {
                    item.visit_references_mut(visit);
                }
            }
            Self::Reference(reference) => {
                visit(reference);
                for value in reference.siblings.values_mut() {
                    value.visit_references_mut(visit);
                }
            }
            Self::Scalar(_) => {}
        }
    }

    /// Names of the definitions referenced anywhere in this subtree.
    #[must_use]
    pub fn definition_refs(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.visit_references(&mut |reference| {
            if let RefTarget::Definition(name) = &reference.target {
                names.insert(name.as_str());
            }
        });
        names
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mapping(mapping) => mapping.serialize(serializer),
            Self::Sequence(items) => items.serialize(serializer),
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Reference(reference) => {
                let mut map = serializer.serialize_map(Some(reference.siblings.len() + 1))?;
                map.serialize_entry(REF_KEY, &reference.target.to_string())?;
                for (key, value) in &reference.siblings {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a YAML node")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Bool(value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Integer(value)))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Node, E> {
        let scalar = i64::try_from(value).map_or(Scalar::Float(value as f64), Scalar::Integer);
        Ok(Node::Scalar(scalar))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Node, E> {
        Ok(Node::Scalar(Scalar::Float(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Node, E> {
        Ok(Node::string(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Node, E> {
        Ok(Node::string(value))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
        let mut mapping = Mapping::with_capacity(access.size_hint().unwrap_or_default());
        while let Some((MappingKey(key), value)) = access.next_entry::<MappingKey, Node>()? {
            mapping.insert(key, value);
        }

        let raw_target = mapping.get(REF_KEY).and_then(Node::as_str).map(RefTarget::parse);
        match raw_target {
            Some(target) => {
                mapping.shift_remove(REF_KEY);
                Ok(Node::Reference(Reference {
                    target,
                    siblings: mapping,
                }))
            }
            None => Ok(Node::Mapping(mapping)),
        }
    }
}

/// Mapping keys are kept as strings: `200:` and `'200':` are the same response code.
struct MappingKey(String);

impl<'de> Deserialize<'de> for MappingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MappingKeyVisitor).map(MappingKey)
    }
}

struct MappingKeyVisitor;

impl Visitor<'_> for MappingKeyVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a scalar mapping key")
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok("null".to_string())
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
        Ok(value)
    }
}
