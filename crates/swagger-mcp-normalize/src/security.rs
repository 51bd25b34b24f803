//! Native OpenAPI 3.x `securitySchemes` normalization. Swagger 2.0's
//! `securityDefinitions` are lifted into this same 3.x shape by
//! [`crate::swagger_convert`] before this module ever runs, so this is the
//! single place that produces [`crate::model::SecurityScheme`].

use std::collections::BTreeMap;

use openapiv3::ReferenceOr;

use crate::model::{OAuth2Flow, ParameterLocation, SecurityScheme};
use crate::report::Report;

/// Normalize every named `components.securitySchemes` entry.
pub fn normalize_security_schemes(
    doc: &openapiv3::OpenAPI,
    report: &mut Report,
) -> BTreeMap<String, SecurityScheme> {
    let mut out = BTreeMap::new();
    let Some(components) = &doc.components else { return out };
    for (name, refor) in &components.security_schemes {
        match refor {
            ReferenceOr::Item(scheme) => {
                out.insert(name.clone(), convert_scheme(scheme));
            }
            ReferenceOr::Reference { reference } => {
                report.warn(
                    format!("security scheme '{name}' is an unsupported external reference: {reference}"),
                    Some(format!("components.securitySchemes.{name}")),
                );
            }
        }
    }
    report.counters.security_schemes = out.len() as u64;
    out
}

fn convert_scheme(raw: &openapiv3::SecurityScheme) -> SecurityScheme {
    match raw {
        openapiv3::SecurityScheme::APIKey { location, name, .. } => SecurityScheme::ApiKey {
            name: name.clone(),
            location: match location {
                openapiv3::APIKeyLocation::Query => ParameterLocation::Query,
                openapiv3::APIKeyLocation::Header => ParameterLocation::Header,
                openapiv3::APIKeyLocation::Cookie => ParameterLocation::Cookie,
            },
        },
        openapiv3::SecurityScheme::HTTP { scheme, bearer_format, .. } => SecurityScheme::Http {
            scheme: scheme.clone(),
            bearer_format: bearer_format.clone(),
        },
        openapiv3::SecurityScheme::OAuth2 { flows, .. } => SecurityScheme::OAuth2 {
            authorization_code: flows.authorization_code.as_ref().map(|f| OAuth2Flow {
                authorization_url: Some(f.authorization_url.clone()),
                token_url: Some(f.token_url.clone()),
                refresh_url: f.refresh_url.clone(),
                scopes: f.scopes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            }),
            implicit: flows.implicit.as_ref().map(|f| OAuth2Flow {
                authorization_url: Some(f.authorization_url.clone()),
                token_url: None,
                refresh_url: f.refresh_url.clone(),
                scopes: f.scopes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            }),
            password: flows.password.as_ref().map(|f| OAuth2Flow {
                authorization_url: None,
                token_url: Some(f.token_url.clone()),
                refresh_url: f.refresh_url.clone(),
                scopes: f.scopes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            }),
            client_credentials: flows.client_credentials.as_ref().map(|f| OAuth2Flow {
                authorization_url: None,
                token_url: Some(f.token_url.clone()),
                refresh_url: f.refresh_url.clone(),
                scopes: f.scopes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            }),
        },
        openapiv3::SecurityScheme::OpenIDConnect { open_id_connect_url, .. } => {
            SecurityScheme::OpenIdConnect { discovery_url: open_id_connect_url.clone() }
        }
        openapiv3::SecurityScheme::MutualTLS { .. } => SecurityScheme::MutualTls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use openapiv3::{Components, Info, OpenAPI};

    fn doc_with_scheme(name: &str, scheme: openapiv3::SecurityScheme) -> OpenAPI {
        let mut schemes = IndexMap::new();
        schemes.insert(name.to_string(), ReferenceOr::Item(scheme));
        OpenAPI {
            openapi: "3.0.3".to_string(),
            info: Info { title: "t".to_string(), version: "1".to_string(), ..Info::default() },
            components: Some(Components { security_schemes: schemes, ..Components::default() }),
            ..OpenAPI::default()
        }
    }

    #[test]
    fn normalizes_api_key_scheme() {
        let doc = doc_with_scheme(
            "apiKeyAuth",
            openapiv3::SecurityScheme::APIKey {
                location: openapiv3::APIKeyLocation::Header,
                name: "X-API-Key".to_string(),
                description: None,
            },
        );
        let mut report = Report::default();
        let schemes = normalize_security_schemes(&doc, &mut report);
        match &schemes["apiKeyAuth"] {
            SecurityScheme::ApiKey { name, location } => {
                assert_eq!(name, "X-API-Key");
                assert_eq!(*location, ParameterLocation::Header);
            }
            other => panic!("expected ApiKey, got {other:?}"),
        }
    }

    #[test]
    fn normalizes_bearer_http_scheme() {
        let doc = doc_with_scheme(
            "bearerAuth",
            openapiv3::SecurityScheme::HTTP {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
                description: None,
            },
        );
        let mut report = Report::default();
        let schemes = normalize_security_schemes(&doc, &mut report);
        match &schemes["bearerAuth"] {
            SecurityScheme::Http { scheme, bearer_format } => {
                assert_eq!(scheme, "bearer");
                assert_eq!(bearer_format.as_deref(), Some("JWT"));
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }
}
