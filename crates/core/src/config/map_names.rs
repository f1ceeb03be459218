//! Output file name templates
//!
//! Map paths are configured as templates such as `fuels/FuelType-{timestep}.asc`.
//! The only recognised variable is `{timestep}`.

use crate::error::ConfigError;

/// Name of the timestep variable (without braces).
pub const TIMESTEP_VAR: &str = "timestep";

fn invalid(template: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.into(),
    }
}

/// Check that a template only uses known variables and balanced braces.
///
/// # Errors
/// Returns [`ConfigError::InvalidTemplate`] describing the first problem.
pub fn check_template_vars(template: &str) -> Result<(), ConfigError> {
    if template.trim().is_empty() {
        return Err(invalid(template, "template is empty"));
    }

    let mut rest = template;
    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(invalid(template, "unmatched \"}\""));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| invalid(template, "unmatched \"{\""))?;
        let name = &after[..close];
        if name != TIMESTEP_VAR {
            return Err(invalid(
                template,
                format!("unknown variable \"{{{name}}}\"; only {{{TIMESTEP_VAR}}} is allowed"),
            ));
        }
        rest = &after[close + 1..];
    }
    Ok(())
}

/// Substitute the timestep into a template.
pub fn replace_template_vars(template: &str, timestep: i32) -> String {
    template.replace(&format!("{{{TIMESTEP_VAR}}}"), &timestep.to_string())
}
