//! Cross-module tests for the registry.
