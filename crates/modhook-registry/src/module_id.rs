use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric module identifier assigned by the host loader.
///
/// Identifiers carry no meaning beyond identity: they are assigned at build
/// time and shift between builds. They are never reused within a registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ModuleId(u32);

impl ModuleId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// `self + offset`, or `None` if the result leaves the `u32` range.
    pub fn offset(self, offset: i64) -> Option<ModuleId> {
        i64::from(self.0)
            .checked_add(offset)
            .and_then(|raw| u32::try_from(raw).ok())
            .map(ModuleId)
    }
}

impl From<u32> for ModuleId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let id = ModuleId::new(10);
        assert_eq!(id.offset(1), Some(ModuleId::new(11)));
        assert_eq!(id.offset(-10), Some(ModuleId::new(0)));
        assert_eq!(id.offset(-11), None);
        assert_eq!(ModuleId::new(u32::MAX).offset(1), None);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&ModuleId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: ModuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ModuleId::new(42));
    }
}
