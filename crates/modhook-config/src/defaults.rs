use crate::LogLevel;

pub fn default_cache() -> bool {
    true // Lookups are cached unless turned off
}

pub fn default_debug_lookups() -> bool {
    false
}

pub fn default_log_level() -> LogLevel {
    LogLevel::Info
}
