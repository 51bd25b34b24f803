//! Dialect gate (design §4.1 step 1).

use swagger_mcp_foundation::{Error, Result};

use crate::model::Dialect;

/// Inspect the raw JSON value's `openapi`/`swagger` field and decide which
/// dialect we're parsing, rejecting unknown major versions.
pub fn detect_dialect(raw: &serde_json::Value) -> Result<Dialect> {
    if let Some(swagger) = raw.get("swagger").and_then(serde_json::Value::as_str) {
        return if swagger.starts_with("2.") {
            Ok(Dialect::Swagger2)
        } else {
            Err(Error::input(format!("unsupported swagger major version: {swagger}")))
        };
    }

    if let Some(openapi) = raw.get("openapi").and_then(serde_json::Value::as_str) {
        return if openapi.starts_with("3.0") {
            Ok(Dialect::OpenApi30)
        } else if openapi.starts_with("3.1") {
            Ok(Dialect::OpenApi31)
        } else {
            Err(Error::input(format!("unsupported openapi major version: {openapi}")))
        };
    }

    Err(Error::input(
        "document has neither a `swagger` nor an `openapi` field".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_swagger_2() {
        let raw = json!({"swagger": "2.0"});
        assert_eq!(detect_dialect(&raw).unwrap(), Dialect::Swagger2);
    }

    #[test]
    fn detects_openapi_30_and_31() {
        assert_eq!(detect_dialect(&json!({"openapi": "3.0.3"})).unwrap(), Dialect::OpenApi30);
        assert_eq!(detect_dialect(&json!({"openapi": "3.1.0"})).unwrap(), Dialect::OpenApi31);
    }

    #[test]
    fn rejects_unknown_major_version() {
        assert!(detect_dialect(&json!({"openapi": "4.0.0"})).is_err());
        assert!(detect_dialect(&json!({"swagger": "1.2"})).is_err());
    }

    #[test]
    fn rejects_missing_version_field() {
        assert!(detect_dialect(&json!({"info": {}})).is_err());
    }
}
