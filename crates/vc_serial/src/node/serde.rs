//! `serde` bridge for the document tree.
//!
//! Numbers and booleans become scalars holding their canonical text; unit and
//! `None` become the scalar `null`.

use core::fmt;

use serde_core::de::{MapAccess, SeqAccess, Visitor};
use serde_core::ser::{SerializeMap, SerializeSeq};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use super::{DataNode, MappingNode, ScalarNode, SequenceNode};

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for DataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(node) => node.serialize(serializer),
            Self::Sequence(node) => node.serialize(serializer),
            Self::Mapping(node) => node.serialize(serializer),
        }
    }
}

impl Serialize for ScalarNode {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.value())
    }
}

impl Serialize for SequenceNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for item in self {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl Serialize for MappingNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct DataNodeVisitor;

impl<'de> Visitor<'de> for DataNodeVisitor {
    type Value = DataNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a scalar, sequence or mapping")
    }

    #[inline]
    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(if v { "true" } else { "false" }))
    }

    #[inline]
    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v.to_string()))
    }

    #[inline]
    fn visit_i128<E>(self, v: i128) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v.to_string()))
    }

    #[inline]
    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v.to_string()))
    }

    #[inline]
    fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v.to_string()))
    }

    #[inline]
    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v.to_string()))
    }

    #[inline]
    fn visit_char<E>(self, v: char) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v.to_string()))
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v))
    }

    #[inline]
    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(DataNode::scalar(v))
    }

    #[inline]
    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(DataNode::null())
    }

    #[inline]
    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(DataNode::null())
    }

    #[inline]
    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        DataNode::deserialize(deserializer)
    }

    #[inline]
    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        DataNode::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut node = SequenceNode::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(item) = seq.next_element::<DataNode>()? {
            node.push(item);
        }
        Ok(DataNode::Sequence(node))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut node = MappingNode::with_capacity(map.size_hint().unwrap_or_default());
        while let Some((key, value)) = map.next_entry::<DataNode, DataNode>()? {
            node.insert(key, value);
        }
        Ok(DataNode::Mapping(node))
    }
}

impl<'de> Deserialize<'de> for DataNode {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DataNodeVisitor)
    }
}
