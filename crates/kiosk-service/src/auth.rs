//! Request authentication helpers.
//!
//! Two key tiers: the service key authenticates the presentation glue
//! (checkout, accounts, catalog reads), the admin key gates reporting and
//! catalog reload. Keys arrive in headers and are compared in constant time.
//!
//! When a tier's key is not configured the check is skipped with a warning;
//! this mirrors the development-mode posture of webhook verification.

use axum::http::HeaderMap;

use crate::config::ServiceConfig;
use crate::crypto::constant_time_eq;
use crate::error::ApiError;

/// Header carrying the service API key.
pub const SERVICE_KEY_HEADER: &str = "x-api-key";

/// Header carrying the admin API key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Require a valid service API key.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if the header is missing or wrong.
pub fn require_service_key(headers: &HeaderMap, config: &ServiceConfig) -> Result<(), ApiError> {
    require_key(headers, SERVICE_KEY_HEADER, config.service_api_key.as_deref(), "service")
}

/// Require a valid admin API key.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if the header is missing or wrong.
pub fn require_admin_key(headers: &HeaderMap, config: &ServiceConfig) -> Result<(), ApiError> {
    require_key(headers, ADMIN_KEY_HEADER, config.admin_api_key.as_deref(), "admin")
}

fn require_key(
    headers: &HeaderMap,
    header: &str,
    expected: Option<&str>,
    tier: &str,
) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        tracing::warn!(tier = %tier, "API key not configured - skipping authentication");
        return Ok(());
    };

    let provided = headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if constant_time_eq(expected, provided) {
        Ok(())
    } else {
        tracing::warn!(tier = %tier, "Rejected request with invalid API key");
        Err(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config_with_keys() -> ServiceConfig {
        ServiceConfig {
            service_api_key: Some("svc-key".into()),
            admin_api_key: Some("adm-key".into()),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn service_key_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(SERVICE_KEY_HEADER, HeaderValue::from_static("svc-key"));
        assert!(require_service_key(&headers, &config_with_keys()).is_ok());
    }

    #[test]
    fn wrong_service_key_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(SERVICE_KEY_HEADER, HeaderValue::from_static("nope"));
        assert!(matches!(
            require_service_key(&headers, &config_with_keys()),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn missing_header_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            require_admin_key(&headers, &config_with_keys()),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn unconfigured_key_skips_check() {
        let headers = HeaderMap::new();
        assert!(require_service_key(&headers, &ServiceConfig::default()).is_ok());
    }
}
