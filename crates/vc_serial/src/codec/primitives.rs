//! Codecs for primitives and strings.
//!
//! All of them round-trip through canonical, locale-free text: `Display`
//! on write, `FromStr` on read.

use alloc::sync::Arc;
use core::fmt::Display;
use core::marker::PhantomData;
use core::str::FromStr;

use super::{CodecCaps, CodecCx, CodecRegistry, Decoded, DynCodec, TypeCodec};
use crate::error::{DecodeError, EncodeError};
use crate::node::{DataNode, ScalarNode};
use crate::validation::ValidationNode;
use crate::value::DataType;

// -----------------------------------------------------------------------------
// ScalarCodec

/// Codec for any `FromStr + Display` type read from a scalar.
///
/// Numeric codecs trim surrounding ASCII whitespace before parsing; string
/// and char codecs take the text as is.
pub struct ScalarCodec<T> {
    trim: bool,
    marker: PhantomData<fn() -> T>,
}

impl<T> ScalarCodec<T> {
    /// Parses the scalar text unchanged.
    #[inline]
    pub const fn new() -> Self {
        Self {
            trim: false,
            marker: PhantomData,
        }
    }

    /// Trims surrounding ASCII whitespace before parsing.
    #[inline]
    pub const fn trimmed() -> Self {
        Self {
            trim: true,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ScalarCodec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScalarCodec<T>
where
    T: DataType + FromStr,
    T::Err: Display,
{
    #[inline]
    fn parse(&self, node: &ScalarNode) -> Result<T, DecodeError> {
        let text = if self.trim {
            node.value().trim_ascii()
        } else {
            node.value()
        };
        text.parse::<T>()
            .map_err(|err| DecodeError::parse(T::type_path(), node.value(), err))
    }
}

impl<T> TypeCodec<T> for ScalarCodec<T>
where
    T: DataType + FromStr + Display,
    T::Err: Display,
{
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::SCALAR
    }

    fn read_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> Result<Decoded<T>, DecodeError> {
        self.parse(node).map(Decoded::scalar)
    }

    fn validate_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> ValidationNode {
        match self.parse(node) {
            Ok(_) => ValidationNode::Validated(node.clone().into()),
            Err(err) => ValidationNode::error(node.clone().into(), err.to_string()),
        }
    }

    fn write(&self, _: CodecCx<'_>, value: &T, _: bool) -> Result<DataNode, EncodeError> {
        Ok(DataNode::scalar(value.to_string()))
    }
}

// -----------------------------------------------------------------------------
// BoolCodec

/// Reads `true` / `false` in any letter case.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolCodec;

impl BoolCodec {
    fn parse(node: &ScalarNode) -> Result<bool, DecodeError> {
        let text = node.value().trim_ascii();
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(DecodeError::parse("bool", node.value(), "expected `true` or `false`"))
        }
    }
}

impl TypeCodec<bool> for BoolCodec {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::SCALAR
    }

    fn read_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> Result<Decoded<bool>, DecodeError> {
        Self::parse(node).map(Decoded::scalar)
    }

    fn validate_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> ValidationNode {
        match Self::parse(node) {
            Ok(_) => ValidationNode::Validated(node.clone().into()),
            Err(err) => ValidationNode::error(node.clone().into(), err.to_string()),
        }
    }

    fn write(&self, _: CodecCx<'_>, value: &bool, _: bool) -> Result<DataNode, EncodeError> {
        Ok(DataNode::scalar(if *value { "true" } else { "false" }))
    }
}

// -----------------------------------------------------------------------------
// DataType impls

/// Implements [`DataType`] for `FromStr + Display` types, read and written
/// as a single scalar through [`ScalarCodec`].
///
/// # Examples
///
/// ```
/// use core::{fmt, str::FromStr};
/// use vc_serial::{SerializationManager, impl_scalar_data_type, node::DataNode};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Faction { Crew, Raider }
///
/// impl FromStr for Faction {
///     type Err = String;
///     fn from_str(s: &str) -> Result<Self, String> {
///         match s {
///             "Crew" => Ok(Self::Crew),
///             "Raider" => Ok(Self::Raider),
///             other => Err(format!("unknown faction `{other}`")),
///         }
///     }
/// }
///
/// impl fmt::Display for Faction {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         fmt::Debug::fmt(self, f)
///     }
/// }
///
/// impl_scalar_data_type!(Faction);
///
/// let manager = SerializationManager::default();
/// let faction = manager.read_value::<Faction>(&DataNode::scalar("Raider"), None).unwrap();
/// assert_eq!(faction, Faction::Raider);
/// assert!(!manager.validate::<Faction>(&DataNode::scalar("Pirate"), None).is_valid());
/// ```
#[macro_export]
macro_rules! impl_scalar_data_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::DataType for $ty {
                fn default_codec() -> $crate::__macro_exports::Arc<dyn $crate::codec::DynCodec> {
                    $crate::codec::CodecAdapter::shared($crate::codec::ScalarCodec::<$ty>::new())
                }
            }
        )+
    };
}

macro_rules! impl_number {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl DataType for $ty {
                fn default_codec() -> Arc<dyn DynCodec> {
                    super::CodecAdapter::shared(ScalarCodec::<$ty>::trimmed())
                }
            }
        )+
    };
}

impl_number!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl DataType for bool {
    fn default_codec() -> Arc<dyn DynCodec> {
        super::CodecAdapter::shared(BoolCodec)
    }
}

impl DataType for char {
    fn default_codec() -> Arc<dyn DynCodec> {
        super::CodecAdapter::shared(ScalarCodec::<char>::new())
    }
}

impl DataType for String {
    fn type_path() -> &'static str {
        "String"
    }

    fn default_codec() -> Arc<dyn DynCodec> {
        super::CodecAdapter::shared(ScalarCodec::<String>::new())
    }
}

pub(super) fn register_primitives(registry: &mut CodecRegistry) {
    macro_rules! register {
        ($($ty:ty),+ $(,)?) => { $( registry.register::<$ty>(); )+ };
    }
    register!(
        bool, char, String, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
        f64
    );
}

#[cfg(test)]
mod tests {
    use crate::SerializationManager;
    use crate::error::DecodeError;
    use crate::node::DataNode;

    #[test]
    fn integers() {
        let manager = SerializationManager::default();
        assert_eq!(manager.read_value::<i32>(&DataNode::scalar(" -42 "), None), Ok(-42));
        assert_eq!(manager.read_value::<u8>(&DataNode::scalar("255"), None), Ok(255));
        let err = manager.read_value::<u8>(&DataNode::scalar("256"), None).unwrap_err();
        assert!(matches!(err, DecodeError::Parse { type_path: "u8", .. }));
        assert_eq!(manager.write(&-7_i64, false, None), Ok(DataNode::scalar("-7")));
    }

    #[test]
    fn floats_reject_text_at_validation() {
        let manager = SerializationManager::default();
        assert!(manager.validate::<f64>(&DataNode::scalar("1.5e3"), None).is_valid());
        assert!(manager.validate::<f32>(&DataNode::scalar("-.25"), None).is_valid());

        let node = manager.validate::<f64>(&DataNode::scalar("fast"), None);
        assert!(!node.is_valid());
        assert_eq!(node.errors().len(), 1);

        assert_eq!(manager.read_value::<f64>(&DataNode::scalar("0.1"), None), Ok(0.1));
        assert_eq!(manager.write(&2.5_f32, false, None), Ok(DataNode::scalar("2.5")));
    }

    #[test]
    fn bools_chars_strings() {
        let manager = SerializationManager::default();
        assert_eq!(manager.read_value::<bool>(&DataNode::scalar("True"), None), Ok(true));
        assert!(manager.read_value::<bool>(&DataNode::scalar("yes"), None).is_err());
        assert_eq!(manager.read_value::<char>(&DataNode::scalar("x"), None), Ok('x'));
        assert!(manager.read_value::<char>(&DataNode::scalar("xy"), None).is_err());
        assert_eq!(
            manager.read_value::<String>(&DataNode::scalar("  padded "), None),
            Ok(String::from("  padded "))
        );
    }

    #[test]
    fn shape_mismatch() {
        let manager = SerializationManager::default();
        let err = manager
            .read_value::<i32>(&DataNode::Sequence(Default::default()), None)
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedShape { type_path: "i32", .. }));
    }
}
