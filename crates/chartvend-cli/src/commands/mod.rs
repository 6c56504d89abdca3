//! CLI commands

pub mod diff;
pub mod patch;
pub mod pull;

use chartvend_core::error::parse_version;

use crate::error::{CliError, Result};

/// Reject chart names that would escape the charts root
pub(crate) fn validate_chart_name(chart: &str) -> Result<()> {
    let trimmed = chart.trim();
    if trimmed.is_empty() {
        return Err(CliError::input("--chart can not be empty"));
    }
    if trimmed != chart || chart.contains(['/', '\\']) || chart == "." || chart == ".." {
        return Err(CliError::input(format!("invalid chart name '{}'", chart)));
    }
    Ok(())
}

/// Check that a flag holds a semantic version
pub(crate) fn validate_version(flag: &str, version: &str) -> Result<()> {
    if version.trim().is_empty() {
        return Err(CliError::input(format!("--{} can not be empty", flag)));
    }
    parse_version(version)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_chart_name() {
        assert!(validate_chart_name("keycloak").is_ok());
        assert!(validate_chart_name("ingress-nginx").is_ok());

        assert!(validate_chart_name("").is_err());
        assert!(validate_chart_name("  ").is_err());
        assert!(validate_chart_name("../etc").is_err());
        assert!(validate_chart_name("bitnami/nginx").is_err());
        assert!(validate_chart_name("..").is_err());
    }

    #[test]
    fn test_validate_version() {
        assert!(validate_version("version", "1.2.3").is_ok());
        assert!(validate_version("version", "2.0.0-rc.1").is_ok());

        let err = validate_version("version", "").unwrap_err();
        assert_eq!(err.exit_code(), crate::exit_codes::INPUT_ERROR);
        assert!(validate_version("version", "1.2").is_err());
        assert!(validate_version("version", "latest").is_err());
    }
}
