//! Dependency-shape matching.
//!
//! A module's dependency list is fixed when it is defined, and because module
//! ids are assigned by the bundler in a stable order, the *shape* of that list
//! is a fingerprint that survives minification. A [`DependencyPattern`]
//! describes such a shape:
//!
//! ```text
//!   [4, _, 2]          exactly three deps: 4, anything, 2
//!   #[4]               at least one dep, the first being 4
//!   [^1, 2]            first dep is "my own id + 1"
//!   [~-2, [5, _]]      first dep is "root id - 2"; second dep has deps [5, anything]
//! ```
//!
//! Relative slots resolve against either the immediate parent (the module
//! whose list is being compared) or the root (the module the filter was
//! evaluated on). Nested patterns recurse into the dependency list of the id
//! at that slot.

use std::fmt::Write as _;

use modhook_registry::{ModuleId, ModuleRegistry};

/// A signed offset from the parent or root module id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelativeId {
    pub offset: i64,
    pub to_root: bool,
}

impl RelativeId {
    pub fn resolve(self, root: ModuleId, parent: ModuleId) -> Option<ModuleId> {
        let base = if self.to_root { root } else { parent };
        base.offset(self.offset)
    }

    fn write_key(self, out: &mut String) {
        let marker = if self.to_root { '~' } else { '^' };
        let _ = write!(out, "{marker}{}", self.offset);
    }
}

/// One position of a [`DependencyPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepSlot {
    Exact(ModuleId),
    Wildcard,
    /// A slot built from an id that was not known. Matches anything, but is
    /// reported in debug builds since it almost always means a lookup that
    /// produced the id failed.
    Unset,
    Relative(RelativeId),
    Nested(DependencyPattern),
}

impl From<ModuleId> for DepSlot {
    fn from(id: ModuleId) -> Self {
        DepSlot::Exact(id)
    }
}

impl From<u32> for DepSlot {
    fn from(raw: u32) -> Self {
        DepSlot::Exact(ModuleId::new(raw))
    }
}

impl From<Option<ModuleId>> for DepSlot {
    fn from(id: Option<ModuleId>) -> Self {
        id.map_or(DepSlot::Unset, DepSlot::Exact)
    }
}

impl From<RelativeId> for DepSlot {
    fn from(relative: RelativeId) -> Self {
        DepSlot::Relative(relative)
    }
}

impl From<DependencyPattern> for DepSlot {
    fn from(pattern: DependencyPattern) -> Self {
        DepSlot::Nested(pattern)
    }
}

/// Wildcard slot.
pub fn any() -> DepSlot {
    DepSlot::Wildcard
}

/// Slot equal to the parent's id plus `offset`.
pub fn relative(offset: i64) -> DepSlot {
    DepSlot::Relative(RelativeId {
        offset,
        to_root: false,
    })
}

/// Slot equal to the root's id plus `offset`.
pub fn relative_to_root(offset: i64) -> DepSlot {
    DepSlot::Relative(RelativeId {
        offset,
        to_root: true,
    })
}

/// An ordered dependency-list shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyPattern {
    slots: Vec<DepSlot>,
    loose: bool,
    relative: Option<RelativeId>,
}

impl DependencyPattern {
    pub fn new(slots: impl IntoIterator<Item = DepSlot>) -> Self {
        Self {
            slots: slots.into_iter().collect(),
            loose: false,
            relative: None,
        }
    }

    /// Allow extra trailing dependencies.
    pub fn loose(mut self) -> Self {
        self.loose = true;
        self
    }

    /// When nested, also require the slot's own id to be the given relative
    /// id. Ignored at the top level.
    pub fn relative_to(mut self, offset: i64, to_root: bool) -> Self {
        self.relative = Some(RelativeId { offset, to_root });
        self
    }

    pub fn slots(&self) -> &[DepSlot] {
        &self.slots
    }

    pub fn is_loose(&self) -> bool {
        self.loose
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when any slot, at any depth, is [`DepSlot::Unset`].
    pub fn has_unset(&self) -> bool {
        self.slots.iter().any(|slot| match slot {
            DepSlot::Unset => true,
            DepSlot::Nested(nested) => nested.has_unset(),
            _ => false,
        })
    }

    /// Canonical string form, used in filter keys. Every pattern, top level
    /// included, is bracketed so nesting stays unambiguous.
    pub fn key(&self) -> String {
        let mut out = String::new();
        self.write_key(&mut out);
        out
    }

    fn write_key(&self, out: &mut String) {
        if self.loose {
            out.push('#');
        }
        if let Some(relative) = self.relative {
            relative.write_key(out);
        }
        out.push('[');
        self.write_slots(out);
        out.push(']');
    }

    fn write_slots(&self, out: &mut String) {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            match slot {
                DepSlot::Wildcard | DepSlot::Unset => out.push('_'),
                DepSlot::Exact(id) => {
                    let _ = write!(out, "{id}");
                }
                DepSlot::Relative(relative) => relative.write_key(out),
                DepSlot::Nested(nested) => nested.write_key(out),
            }
        }
    }

    /// Match `id`'s dependency list, with `id` as both root and parent.
    pub fn matches_module(&self, registry: &ModuleRegistry, id: ModuleId) -> bool {
        registry
            .dependencies(id)
            .is_some_and(|actual| matches(registry, &actual, self, id, id))
    }
}

impl FromIterator<DepSlot> for DependencyPattern {
    fn from_iter<T: IntoIterator<Item = DepSlot>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Compare `actual` (the dependency list of `parent`) against `pattern`.
///
/// Returns on the first mismatching slot. A nested slot whose id has no
/// known dependency list is a mismatch.
pub fn matches(
    registry: &ModuleRegistry,
    actual: &[ModuleId],
    pattern: &DependencyPattern,
    root: ModuleId,
    parent: ModuleId,
) -> bool {
    let length_ok = if pattern.loose {
        actual.len() >= pattern.slots.len()
    } else {
        actual.len() == pattern.slots.len()
    };
    if !length_ok {
        return false;
    }

    pattern.slots.iter().zip(actual).all(|(slot, &id)| match slot {
        DepSlot::Wildcard | DepSlot::Unset => true,
        DepSlot::Exact(expected) => *expected == id,
        DepSlot::Relative(relative) => relative.resolve(root, parent) == Some(id),
        DepSlot::Nested(nested) => {
            if let Some(relative) = nested.relative {
                if relative.resolve(root, parent) != Some(id) {
                    return false;
                }
            }
            registry
                .dependencies(id)
                .is_some_and(|inner| matches(registry, &inner, nested, root, id))
        }
    })
}
