// ABOUTME: Utility functions for validation and display
// ABOUTME: Provides table name validation and identifier sanitization

use anyhow::{bail, Result};
use std::path::Path;

/// Validate a DynamoDB table name
///
/// Table names must be 3 to 255 characters from the set
/// `a-z A-Z 0-9 _ - .`. Validation happens before any dump file path is
/// derived from a table name, so a malformed name can never escape the
/// configured dump directories.
///
/// # Examples
///
/// ```
/// # use dynamo_archiver::utils::validate_table_name;
/// assert!(validate_table_name("users").is_ok());
/// assert!(validate_table_name("prod.events-2024_q1").is_ok());
/// assert!(validate_table_name("ab").is_err());
/// assert!(validate_table_name("../etc/passwd").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.len() < 3 || name.len() > 255 {
        bail!(
            "Invalid table name '{}': must be 3 to 255 characters",
            sanitize_identifier(name)
        );
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        bail!(
            "Invalid table name '{}': only a-z, A-Z, 0-9, '_', '-' and '.' are allowed",
            sanitize_identifier(name)
        );
    }

    // "." is valid inside a name but a name of only dots would traverse paths
    if name.chars().all(|c| c == '.') {
        bail!("Invalid table name: must contain at least one non-dot character");
    }

    Ok(())
}

/// Sanitize an identifier (table name, attribute name, etc.) for display
///
/// Removes control characters and limits length to prevent log injection
/// and keep error messages readable. For display purposes only.
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}

/// Extract the table name from a dump file path (`<table>.json`)
///
/// Returns `None` for paths without a `.json` extension.
pub fn dump_file_table_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return None;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}
