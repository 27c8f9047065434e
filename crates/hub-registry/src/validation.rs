//! Identifier and digest validation
//!
//! Namespace, resource and channel names share one grammar; version strings
//! are semantic versions. Violations are reported as `BadRequest`.

use hub_core::{ErrorCode, RegistryError, RegistryResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Name grammar: lowercase alphanumerics and inner hyphens, 1 to 63 chars
pub const NAME_PATTERN: &str = r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$";

/// Digest algorithm accepted for archives
pub const DIGEST_ALGORITHM: &str = "sha256";

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(NAME_PATTERN).expect("name pattern is a valid regex"));

fn bad_request(message: String) -> RegistryError {
    RegistryError::domain(ErrorCode::BadRequest, message)
}

/// Validate a namespace, resource or channel name
pub fn validate_name(kind: &str, name: &str) -> RegistryResult<()> {
    if NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(bad_request(format!(
            "invalid {} name {:?}: must match {}",
            kind, name, NAME_PATTERN
        )))
    }
}

/// Validate a version string
pub fn validate_version(string: &str) -> RegistryResult<semver::Version> {
    semver::Version::parse(string)
        .map_err(|e| bad_request(format!("invalid version {:?}: {}", string, e)))
}

/// Parse an `Archive-Digest` value into lowercase hex
///
/// Accepts `sha256:<hex>` or bare hex. The digest is required.
pub fn parse_digest(digest: Option<&str>) -> RegistryResult<String> {
    let digest = digest
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| bad_request("missing archive digest".to_string()))?;

    let hex = match digest.split_once(':') {
        Some((algorithm, hex)) if algorithm.eq_ignore_ascii_case(DIGEST_ALGORITHM) => hex,
        Some((algorithm, _)) => {
            return Err(bad_request(format!(
                "unsupported digest algorithm {:?}",
                algorithm
            )))
        }
        None => digest,
    };

    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad_request(format!("malformed archive digest {:?}", digest)));
    }

    Ok(hex.to_ascii_lowercase())
}

/// Render lowercase hex as a stored digest
pub fn format_digest(hex: &str) -> String {
    format!("{}:{}", DIGEST_ALGORITHM, hex)
}

/// Hex part of a stored digest
pub fn digest_hex(digest: &str) -> &str {
    digest
        .split_once(':')
        .map(|(_, hex)| hex)
        .unwrap_or(digest)
}
