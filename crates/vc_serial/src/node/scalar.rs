use core::fmt;
use core::hash::{Hash, Hasher};

/// A leaf of the document tree carrying text only.
#[derive(Clone, PartialEq, Eq)]
pub struct ScalarNode {
    value: String,
}

impl ScalarNode {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The scalar `null`.
    #[inline]
    pub fn null() -> Self {
        Self::new("null")
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }

    /// Returns `true` for `null` and `~`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.value.as_str(), "null" | "~")
    }
}

// Must agree with `TagKey::hash`.
impl Hash for ScalarNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(0);
        self.value.as_str().hash(state);
    }
}

impl fmt::Debug for ScalarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}

impl From<&str> for ScalarNode {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ScalarNode {
    #[inline]
    fn from(value: String) -> Self {
        Self { value }
    }
}
