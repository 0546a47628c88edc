use crate::error::{ConfigError, Result};
use crate::{LogLevel, ModhookConfig};

/// Validate extra filter directives: a comma-separated list with no empty
/// entries and no whitespace inside an entry.
pub fn validate_filter(filter: &str) -> Result<()> {
    if filter.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "logging.filter".to_string(),
            value: "".to_string(),
            hint: "Remove the field or give at least one directive, e.g. modhook_finder=debug"
                .to_string(),
        });
    }

    for directive in filter.split(',') {
        let directive = directive.trim();
        if directive.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter".to_string(),
                value: filter.to_string(),
                hint: "Empty directive between commas".to_string(),
            });
        }
        if directive.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter".to_string(),
                value: filter.to_string(),
                hint: format!("Directive '{}' contains whitespace", directive),
            });
        }
    }

    Ok(())
}

impl ModhookConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if let Some(filter) = &self.logging.filter {
            validate_filter(filter)?;
        }

        if self.finder.debug_lookups && self.logging.level == LogLevel::Silent {
            return Err(ConfigError::InvalidValue {
                field: "finder.debug_lookups".to_string(),
                value: "true".to_string(),
                hint: "Lookup results are logged; raise logging.level above silent".to_string(),
            });
        }

        Ok(())
    }
}
