//! The normalized data model (design §3): `SpecificationDocument`,
//! `Endpoint`, `Parameter`, `Schema`, `SecurityScheme`, `DependencyEdge`.
//!
//! These are our own types, not `openapiv3`'s — the whole point of the
//! normalizer is to turn `openapiv3`'s inline-heavy, dialect-specific AST
//! into a uniform, dependency-annotated value graph that the rest of the
//! pipeline (categorizer, storage, query engine) can treat generically.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One parsed and normalized OpenAPI/Swagger document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationDocument {
    /// API title (`info.title`).
    pub title: String,
    /// API semantic version (`info.version`).
    pub version: String,
    /// The spec dialect actually parsed (`2.0`, `3.0.x`, `3.1.x`).
    pub dialect: Dialect,
    /// `info.description`.
    pub description: Option<String>,
    /// Ordered base URLs with their template variables.
    pub servers: Vec<Server>,
    /// `info.contact`, rendered as a small string blob (name/url/email).
    pub contact: Option<String>,
    /// `info.license`.
    pub license: Option<String>,
    /// Stable content hash (SHA-256 of the canonicalized source bytes),
    /// used for ingest deduplication (design §3 "Lifecycle").
    pub content_hash: String,
    /// Path to the source file, if loaded from disk.
    pub source_file_path: Option<String>,
    /// Size of the source file in bytes.
    pub byte_size: u64,
    /// All endpoints in this document.
    pub endpoints: Vec<Endpoint>,
    /// All named schemas in this document, keyed by name.
    pub schemas: BTreeMap<String, Schema>,
    /// All named security schemes, keyed by name.
    pub security_schemes: BTreeMap<String, SecurityScheme>,
    /// Dependency edges from endpoints to schemas.
    pub dependency_edges: Vec<DependencyEdge>,
    /// Document-level `x-*` extensions.
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// `x-tagGroups`, surfaced verbatim for the categorizer (C2).
    pub tag_groups: Vec<TagGroup>,
    /// Root-level tag definitions (name + description), in original order.
    pub tags: Vec<TagDefinition>,
    /// When this document was ingested.
    pub ingested_at: DateTime<Utc>,
}

/// A root `tags` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDefinition {
    /// The tag name as it appears on operations.
    pub name: String,
    /// The tag's human-readable description, if any.
    pub description: Option<String>,
}

/// One entry of the `x-tagGroups` vendor extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagGroup {
    /// The group's display name.
    pub name: String,
    /// Tag names belonging to this group.
    pub tags: Vec<String>,
}

/// The OpenAPI/Swagger dialect a document was parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// Swagger 2.0, lifted to the 3.x shape before normalization.
    Swagger2,
    /// OpenAPI 3.0.x.
    OpenApi30,
    /// OpenAPI 3.1.x.
    OpenApi31,
}

impl Dialect {
    /// The canonical string used in the `apis.dialect` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swagger2 => "2.0",
            Self::OpenApi30 => "3.0.x",
            Self::OpenApi31 => "3.1.x",
        }
    }
}

/// A server URL with its template variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// The URL template, e.g. `https://{env}.example.com/v1`.
    pub url: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Template variable name -> default/enum values.
    pub variables: BTreeMap<String, Vec<String>>,
}

/// A unique `(path, method)` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    /// The raw path template, e.g. `/pets/{petId}`.
    pub path: String,
    /// Upper-cased HTTP method.
    pub method: String,
    /// `operationId`, present verbatim or synthesized (never used to dedupe).
    pub operation_id: String,
    /// Whether the `operationId` was synthesized rather than declared.
    pub operation_id_synthesized: bool,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Tags in original order.
    pub tags: Vec<String>,
    /// Parameters, operation-level entries shadowing path-item entries by
    /// `(name, location)`.
    pub parameters: Vec<Parameter>,
    /// The request body, if any.
    pub request_body: Option<RequestBody>,
    /// Status code -> response.
    pub responses: BTreeMap<String, Response>,
    /// Security requirements (OR of AND-groups); an explicit empty list
    /// means "no auth", distinct from an absent `security` key which
    /// inherits the document-level requirement.
    pub security: Vec<SecurityRequirement>,
    /// `deprecated` flag.
    pub deprecated: bool,
    /// `x-*` extensions on the operation.
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// Category assigned by C2; `None` until the categorizer runs.
    pub category: Option<String>,
    /// Category group assigned by C2.
    pub category_group: Option<String>,
    /// Schema names reachable from parameters, request body, and responses.
    pub schema_dependencies: BTreeSet<String>,
    /// Derived: concatenated free-text search field (design §3, §4.1 step 8).
    pub searchable_text: String,
    /// Derived: parameter names.
    pub parameter_names: Vec<String>,
    /// Derived: all response status codes as strings.
    pub response_codes: Vec<String>,
    /// Derived: all response/request content types.
    pub content_types: Vec<String>,
}

/// One security requirement: scheme name -> required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Where a parameter lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string parameter.
    Query,
    /// Path template parameter.
    Path,
    /// HTTP header parameter.
    Header,
    /// Cookie parameter.
    Cookie,
}

/// A request parameter (tagged variant, discriminated on `location` per
/// design §9 — each variant only has the fields meaningful to it, but
/// since the location set is small and fields largely overlap, this is
/// modeled as one struct with a discriminator field rather than four
/// near-identical enum variants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    pub location: ParameterLocation,
    /// Whether the parameter is required. Path parameters are always
    /// required by construction.
    pub required: bool,
    /// The parameter's schema (already normalized; never a dangling `$ref`).
    pub schema: SchemaRef,
    /// Human-readable description.
    pub description: Option<String>,
    /// Named examples, if declared.
    pub examples: BTreeMap<String, serde_json::Value>,
}

/// A request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the body is required.
    pub required: bool,
    /// Content type -> schema.
    pub content: BTreeMap<String, SchemaRef>,
    /// Description.
    pub description: Option<String>,
}

/// One response entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Response description (required by OpenAPI).
    pub description: String,
    /// Content type -> schema.
    pub content: BTreeMap<String, SchemaRef>,
}

/// A reference to a normalized schema: either a named component schema or
/// an anonymous inline schema assigned a synthetic name.
///
/// Per design §9 ("represent `$ref` as a name handle, not an embedded
/// substructure"), this is always just a name — the actual `Schema` lives
/// in `SpecificationDocument::schemas` and is resolved lazily by name
/// lookup, which is how schema cycles stay representable without infinite
/// structures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRef(pub String);

/// JSON-Schema-like type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// JSON object.
    Object,
    /// JSON array.
    Array,
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON integer.
    Integer,
    /// JSON boolean.
    Boolean,
    /// JSON null (3.1 `type: null` and 3.0 `nullable: true` unify here).
    Null,
}

/// Validation constraints carried on a schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConstraints {
    /// Inclusive numeric minimum.
    pub minimum: Option<f64>,
    /// Inclusive numeric maximum.
    pub maximum: Option<f64>,
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Regex pattern a string must match.
    pub pattern: Option<String>,
    /// Minimum array length.
    pub min_items: Option<u64>,
    /// Maximum array length.
    pub max_items: Option<u64>,
    /// Whether array items must be unique.
    pub unique_items: bool,
}

/// Composition keyword references, kept as name lists (not merged — design
/// §4.1 step 4: "do not attempt to materialize `allOf` into a merged
/// schema; that is a client concern").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Composition {
    /// `allOf` member schema names.
    pub all_of: Vec<SchemaRef>,
    /// `oneOf` member schema names.
    pub one_of: Vec<SchemaRef>,
    /// `anyOf` member schema names.
    pub any_of: Vec<SchemaRef>,
    /// `not` schema name.
    pub not: Option<SchemaRef>,
}

/// A normalized schema definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// The schema's name (component name, or a synthesized name for an
    /// inline schema anchored to its declaring entity).
    pub name: String,
    /// The JSON-Schema type, if a single scalar type applies. Composition
    /// schemas (`allOf`/`oneOf`/`anyOf`-only) may have no `type`.
    pub schema_type: Option<SchemaType>,
    /// `format` (e.g. `date-time`, `int64`).
    pub format: Option<String>,
    /// `title`.
    pub title: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// Object property name -> schema reference.
    pub properties: BTreeMap<String, SchemaRef>,
    /// Required property names.
    pub required: BTreeSet<String>,
    /// Array item schema reference.
    pub items: Option<SchemaRef>,
    /// Enumeration values, verbatim.
    pub enum_values: Vec<serde_json::Value>,
    /// Composition slots.
    pub composition: Composition,
    /// Validation constraints.
    pub constraints: ValidationConstraints,
    /// `readOnly` flag.
    pub read_only: bool,
    /// `writeOnly` flag.
    pub write_only: bool,
    /// `deprecated` flag.
    pub deprecated: bool,
    /// `discriminator.propertyName`, if present.
    pub discriminator: Option<String>,
    /// `example`/`examples`, verbatim.
    pub example: Option<serde_json::Value>,
    /// `x-*` extensions.
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// JSON Schema keywords this normalizer doesn't model explicitly,
    /// preserved verbatim (design §4.1 edge policy).
    pub unknown_keywords: BTreeMap<String, serde_json::Value>,
    /// Schema names this schema references via one-hop `$ref` (direct,
    /// not transitively closed — design §3 invariant).
    pub dependencies: BTreeSet<String>,
    /// Number of distinct endpoints/schemas naming this schema.
    pub reference_count: u64,
    /// Whether a cycle back to an ancestor schema was detected while
    /// walking this schema's subtree (design §9 "record cycles as an
    /// annotation, do not attempt to flatten").
    pub has_cycle: bool,
    /// Derived: concatenated free-text search field.
    pub searchable_text: String,
    /// Derived: property names, for the query engine's `param:`/`type:`
    /// field search over schemas.
    pub property_names: Vec<String>,
}

/// An OAuth2 flow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Flow {
    /// Authorization URL (authorizationCode, implicit).
    pub authorization_url: Option<String>,
    /// Token URL (authorizationCode, password, clientCredentials).
    pub token_url: Option<String>,
    /// Refresh URL.
    pub refresh_url: Option<String>,
    /// Scope name -> description.
    pub scopes: BTreeMap<String, String>,
}

/// A normalized security scheme (tagged variant per design §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SecurityScheme {
    /// `apiKey`.
    ApiKey {
        /// The header/query/cookie parameter name.
        name: String,
        /// Where the key is carried.
        location: ParameterLocation,
    },
    /// `http` (basic, bearer, digest, ...).
    Http {
        /// The HTTP auth scheme, e.g. `bearer`.
        scheme: String,
        /// `bearerFormat`, if declared.
        bearer_format: Option<String>,
    },
    /// `oauth2`, with named flows.
    OAuth2 {
        /// `authorizationCode` flow.
        authorization_code: Option<OAuth2Flow>,
        /// `implicit` flow.
        implicit: Option<OAuth2Flow>,
        /// `password` flow.
        password: Option<OAuth2Flow>,
        /// `clientCredentials` flow.
        client_credentials: Option<OAuth2Flow>,
    },
    /// `openIdConnect`.
    OpenIdConnect {
        /// The discovery document URL.
        discovery_url: String,
    },
    /// Mutual TLS.
    MutualTls,
}

impl SecurityScheme {
    /// The scheme kind as a lowercase string, for the `security_schemes`
    /// table's `type` column.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey { .. } => "apiKey",
            Self::Http { .. } => "http",
            Self::OAuth2 { .. } => "oauth2",
            Self::OpenIdConnect { .. } => "openIdConnect",
            Self::MutualTls => "mutualTLS",
        }
    }
}

/// The role a dependency edge plays, i.e. where in the endpoint a schema
/// was referenced from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DependencyRole {
    /// Referenced from a parameter's schema.
    Parameter,
    /// Referenced from the request body.
    RequestBody,
    /// Referenced from a response, tagged with its status code.
    Response(String),
    /// Referenced from a callback.
    Callback,
}

/// A directed edge from an endpoint to a schema (design §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// `(path, method)` of the owning endpoint.
    pub endpoint_path: String,
    /// HTTP method of the owning endpoint.
    pub endpoint_method: String,
    /// The referenced schema's name.
    pub schema_name: String,
    /// The role this reference plays.
    pub role: DependencyRole,
}
