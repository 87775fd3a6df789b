/// Construction options for a [`SerializationManager`](crate::SerializationManager).
///
/// # Examples
///
/// ```
/// use vc_serial::{SerializationConfig, SerializationManager};
///
/// let config = SerializationConfig::new().with_authoritative(false);
/// let manager = SerializationManager::new(config);
/// assert!(!manager.is_authoritative());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializationConfig {
    /// Whether this peer is the authority. `server_only` fields are
    /// neither read nor written when `false`.
    pub authoritative: bool,
    /// Register codecs for primitives and `String` on construction.
    pub register_primitives: bool,
}

impl SerializationConfig {
    pub const DEFAULT: Self = Self {
        authoritative: true,
        register_primitives: true,
    };

    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub const fn with_authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }

    #[inline]
    pub const fn with_register_primitives(mut self, register: bool) -> Self {
        self.register_primitives = register;
        self
    }
}

impl Default for SerializationConfig {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}
