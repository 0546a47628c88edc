//! Cross-module finder behaviour.


use modhook_registry::{ModuleId, ModuleRegistry};
use modhook_value::{Object, Value};

pub(crate) fn id(raw: u32) -> ModuleId {
    ModuleId::new(raw)
}

/// An object exports value with the given keys set to `true`.
pub(crate) fn exports(keys: &[&str]) -> Value {
    keys.iter()
        .fold(Object::new(), |object, key| object.with(*key, true))
        .into()
}

/// Define `(id, deps, keys)` modules without requiring them.
pub(crate) fn registry_with(modules: &[(u32, &[u32], &[&str])]) -> ModuleRegistry {
    let registry = ModuleRegistry::new();
    for (raw, deps, keys) in modules {
        registry
            .define_value(id(*raw), deps.iter().copied().map(ModuleId::new), exports(keys))
            .unwrap();
    }
    registry
}
