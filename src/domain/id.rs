//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Instrument identifier - newtype for type safety.
///
/// The inner integer is private so construction goes through the defined
/// constructors and row-mapping code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetalId(i32);

impl MetalId {
    /// Create a new `MetalId` from a raw database id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw integer id.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MetalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for MetalId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}
