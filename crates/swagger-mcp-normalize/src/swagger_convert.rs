//! Swagger 2.0 → OpenAPI 3.0 shape lift (design §4.1 step 5).
//!
//! `openapiv3` only understands the 3.x object model, so a Swagger 2.0
//! document is first rewritten, as a JSON value, into the 3.x shape and
//! then deserialized through the same `openapiv3::OpenAPI` path as a
//! native 3.x document.

use serde_json::{json, Map, Value};
use swagger_mcp_foundation::Result;

/// Rewrite a parsed Swagger 2.0 document into the OpenAPI 3.0 JSON shape.
pub fn lift_swagger2_to_openapi3(mut raw: Value) -> Result<Value> {
    let obj = raw.as_object_mut().ok_or_else(|| {
        swagger_mcp_foundation::Error::input("Swagger document root must be a JSON object")
    })?;

    let host = obj.get("host").and_then(Value::as_str).unwrap_or("localhost").to_string();
    let base_path = obj.get("basePath").and_then(Value::as_str).unwrap_or("").to_string();
    let schemes = obj
        .get("schemes")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect::<Vec<_>>())
        .unwrap_or_else(|| vec!["https".to_string()]);
    let global_consumes = string_array(obj.get("consumes"));
    let global_produces = string_array(obj.get("produces"));

    let mut lifted = Map::new();
    lifted.insert("openapi".to_string(), json!("3.0.3"));
    if let Some(info) = obj.remove("info") {
        lifted.insert("info".to_string(), info);
    }
    let servers: Vec<Value> = schemes
        .iter()
        .map(|scheme| json!({ "url": format!("{scheme}://{host}{base_path}") }))
        .collect();
    lifted.insert("servers".to_string(), Value::Array(servers));

    let mut components = Map::new();
    if let Some(Value::Object(defs)) = obj.remove("definitions") {
        components.insert("schemas".to_string(), Value::Object(defs));
    }
    if let Some(Value::Object(params)) = obj.remove("parameters") {
        components.insert("parameters".to_string(), Value::Object(params));
    }
    if let Some(Value::Object(responses)) = obj.remove("responses") {
        components.insert("responses".to_string(), Value::Object(responses));
    }
    if let Some(Value::Object(defs)) = obj.remove("securityDefinitions") {
        let mut lifted_schemes = Map::new();
        for (name, def) in defs {
            lifted_schemes.insert(name, lift_security_scheme(def));
        }
        components.insert("securitySchemes".to_string(), Value::Object(lifted_schemes));
    }
    if !components.is_empty() {
        lifted.insert("components".to_string(), Value::Object(components));
    }

    if let Some(security) = obj.remove("security") {
        lifted.insert("security".to_string(), security);
    }
    if let Some(tags) = obj.remove("tags") {
        lifted.insert("tags".to_string(), tags);
    }
    for (key, value) in obj.iter() {
        if key.starts_with("x-") {
            lifted.insert(key.clone(), value.clone());
        }
    }

    if let Some(Value::Object(paths)) = obj.remove("paths") {
        let mut lifted_paths = Map::new();
        for (path, item) in paths {
            lifted_paths.insert(path, lift_path_item(item, &global_consumes, &global_produces));
        }
        lifted.insert("paths".to_string(), Value::Object(lifted_paths));
    }

    Ok(Value::Object(lifted))
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn lift_security_scheme(def: Value) -> Value {
    let Some(obj) = def.as_object() else { return def };
    let kind = obj.get("type").and_then(Value::as_str).unwrap_or_default();
    match kind {
        "basic" => json!({ "type": "http", "scheme": "basic" }),
        "apiKey" => json!({
            "type": "apiKey",
            "name": obj.get("name").cloned().unwrap_or(Value::Null),
            "in": obj.get("in").cloned().unwrap_or(Value::Null),
        }),
        "oauth2" => {
            let flow_kind = obj.get("flow").and_then(Value::as_str).unwrap_or("implicit");
            let flow_name = match flow_kind {
                "accessCode" => "authorizationCode",
                "application" => "clientCredentials",
                other => other,
            };
            json!({
                "type": "oauth2",
                "flows": {
                    flow_name: {
                        "authorizationUrl": obj.get("authorizationUrl").cloned().unwrap_or(Value::Null),
                        "tokenUrl": obj.get("tokenUrl").cloned().unwrap_or(Value::Null),
                        "scopes": obj.get("scopes").cloned().unwrap_or_else(|| json!({})),
                    }
                }
            })
        }
        other => json!({ "type": other }),
    }
}

fn lift_path_item(item: Value, global_consumes: &[String], global_produces: &[String]) -> Value {
    let Value::Object(mut item_obj) = item else { return item };
    const METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

    let shared_params = item_obj.get("parameters").cloned();

    for method in METHODS {
        if let Some(op) = item_obj.get_mut(*method) {
            lift_operation(op, global_consumes, global_produces, shared_params.as_ref());
        }
    }
    Value::Object(item_obj)
}

fn lift_operation(
    op: &mut Value,
    global_consumes: &[String],
    global_produces: &[String],
    shared_params: Option<&Value>,
) {
    let Some(op_obj) = op.as_object_mut() else { return };

    let consumes = {
        let local = string_array(op_obj.get("consumes"));
        if local.is_empty() { global_consumes.to_vec() } else { local }
    };
    let produces = {
        let local = string_array(op_obj.get("produces"));
        if local.is_empty() { global_produces.to_vec() } else { local }
    };

    let mut own_params: Vec<Value> = op_obj
        .remove("parameters")
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default();
    if let Some(Value::Array(shared)) = shared_params {
        // Operation-level parameters shadow path-item ones by (name, in);
        // since extraction later re-applies shadowing by (name, location)
        // anyway, simple concatenation here is sufficient — duplicates are
        // resolved at endpoint-extraction time, not here.
        let mut combined = shared.clone();
        combined.append(&mut own_params);
        own_params = combined;
    }

    let mut kept_params = Vec::new();
    let mut body_schema = None;
    let mut form_params = Vec::new();

    for param in own_params {
        let Some(param_obj) = param.as_object() else {
            kept_params.push(param);
            continue;
        };
        match param_obj.get("in").and_then(Value::as_str) {
            Some("body") => {
                body_schema = param_obj.get("schema").cloned();
            }
            Some("formData") => form_params.push(param),
            _ => kept_params.push(param),
        }
    }

    op_obj.insert("parameters".to_string(), Value::Array(kept_params));

    if let Some(schema) = body_schema {
        let content_type = consumes.first().cloned().unwrap_or_else(|| "application/json".to_string());
        op_obj.insert(
            "requestBody".to_string(),
            json!({ "required": true, "content": { content_type: { "schema": schema } } }),
        );
    } else if !form_params.is_empty() {
        let content_type = if consumes.iter().any(|c| c == "multipart/form-data") {
            "multipart/form-data"
        } else {
            "application/x-www-form-urlencoded"
        };
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &form_params {
            let Some(p) = param.as_object() else { continue };
            let name = p.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
            let mut schema = p.clone();
            schema.remove("name");
            schema.remove("in");
            schema.remove("required");
            if p.get("required").and_then(Value::as_bool).unwrap_or(false) {
                required.push(json!(name));
            }
            properties.insert(name, Value::Object(schema));
        }
        op_obj.insert(
            "requestBody".to_string(),
            json!({
                "required": true,
                "content": {
                    content_type: {
                        "schema": { "type": "object", "properties": properties, "required": required }
                    }
                }
            }),
        );
    }

    if let Some(Value::Object(responses)) = op_obj.get_mut("responses") {
        let default_content_type = produces.first().cloned().unwrap_or_else(|| "application/json".to_string());
        for (_, response) in responses.iter_mut() {
            let Some(response_obj) = response.as_object_mut() else { continue };
            if let Some(schema) = response_obj.remove("schema") {
                response_obj.insert(
                    "content".to_string(),
                    json!({ default_content_type.clone(): { "schema": schema } }),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifts_host_scheme_basepath_into_a_server_url() {
        let raw = json!({
            "swagger": "2.0",
            "host": "api.example.com",
            "basePath": "/v1",
            "schemes": ["https"],
            "info": {"title": "t", "version": "1"},
            "paths": {}
        });
        let lifted = lift_swagger2_to_openapi3(raw).unwrap();
        assert_eq!(lifted["servers"][0]["url"], "https://api.example.com/v1");
        assert_eq!(lifted["openapi"], "3.0.3");
    }

    #[test]
    fn lifts_definitions_into_components_schemas() {
        let raw = json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "definitions": {"Pet": {"type": "object"}},
            "paths": {}
        });
        let lifted = lift_swagger2_to_openapi3(raw).unwrap();
        assert_eq!(lifted["components"]["schemas"]["Pet"]["type"], "object");
    }

    #[test]
    fn lifts_body_parameter_into_request_body() {
        let raw = json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/pets": {
                    "post": {
                        "consumes": ["application/json"],
                        "parameters": [
                            {"name": "pet", "in": "body", "required": true, "schema": {"type": "object"}}
                        ],
                        "responses": {"200": {"description": "ok"}}
                    }
                }
            }
        });
        let lifted = lift_swagger2_to_openapi3(raw).unwrap();
        let body = &lifted["paths"]["/pets"]["post"]["requestBody"];
        assert_eq!(body["content"]["application/json"]["schema"]["type"], "object");
    }

    #[test]
    fn lifts_api_key_security_definition() {
        let raw = json!({
            "swagger": "2.0",
            "info": {"title": "t", "version": "1"},
            "securityDefinitions": {
                "apiKeyAuth": {"type": "apiKey", "name": "X-API-Key", "in": "header"}
            },
            "paths": {}
        });
        let lifted = lift_swagger2_to_openapi3(raw).unwrap();
        let scheme = &lifted["components"]["securitySchemes"]["apiKeyAuth"];
        assert_eq!(scheme["type"], "apiKey");
        assert_eq!(scheme["name"], "X-API-Key");
    }
}
