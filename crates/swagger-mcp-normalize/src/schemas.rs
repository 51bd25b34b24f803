//! `$ref` resolution and schema normalization (design §4.1 steps 2 and 4).
//!
//! `openapiv3::Schema` is inline-heavy: object properties and array items
//! embed `ReferenceOr<Box<Schema>>` rather than a name, and nothing stops a
//! schema graph from being cyclic. [`SchemaCollector`] walks the raw
//! `openapiv3` component map once and rewrites it into our own
//! [`crate::model::Schema`] graph, where every reference is a [`SchemaRef`]
//! name handle (design §9) — including inline (anonymous) schemas, which
//! are assigned a synthetic dotted name anchored to their declaring parent
//! so that `SchemaRef` never needs to carry an embedded substructure.
//!
//! Cycles are not an error: a schema that loops back to an ancestor is
//! flagged with `has_cycle = true` on the ancestor and left exactly as
//! named references, never inlined or flattened.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use openapiv3::{ReferenceOr, VariantOrUnknownOrEmpty};
use serde_json::{json, Value};

use crate::model::{Composition, Schema, SchemaRef, SchemaType, ValidationConstraints};
use crate::report::Report;

/// Walks a raw `openapiv3` component schema map into the normalized graph.
pub struct SchemaCollector<'a> {
    components: &'a IndexMap<String, ReferenceOr<openapiv3::Schema>>,
    schemas: BTreeMap<String, Schema>,
    in_progress: BTreeSet<String>,
    cycle_closures: BTreeSet<String>,
    anon_seq: u64,
    cycles_detected: u64,
    report: &'a mut Report,
}

impl<'a> SchemaCollector<'a> {
    /// Build a collector over `components.schemas`.
    pub fn new(
        components: &'a IndexMap<String, ReferenceOr<openapiv3::Schema>>,
        report: &'a mut Report,
    ) -> Self {
        Self {
            components,
            schemas: BTreeMap::new(),
            in_progress: BTreeSet::new(),
            cycle_closures: BTreeSet::new(),
            anon_seq: 0,
            cycles_detected: 0,
            report,
        }
    }

    /// Resolve every named component schema (and every inline schema
    /// reachable from them) into the running graph, without consuming the
    /// collector — callers that still need to fold in endpoint-discovered
    /// inline schemas (via [`Self::resolve_external`]) use this instead of
    /// [`Self::collect`].
    pub fn collect_named(&mut self) {
        let names: Vec<String> = self.components.keys().cloned().collect();
        for name in names {
            self.resolve_named(&name);
        }
        self.report.counters.schemas = self.schemas.len() as u64;
        self.report.counters.cycles_detected = self.cycles_detected;
    }

    /// Resolve every named component schema, returning the full normalized
    /// schema graph directly. Convenience wrapper over
    /// [`Self::collect_named`] + [`Self::into_schemas`] for callers with no
    /// further schemas to fold in.
    pub fn collect(mut self) -> BTreeMap<String, Schema> {
        self.collect_named();
        self.schemas
    }

    /// Consume the collector, handing back the accumulated schema graph.
    pub fn into_schemas(mut self) -> BTreeMap<String, Schema> {
        self.report.counters.schemas = self.schemas.len() as u64;
        self.report.counters.cycles_detected = self.cycles_detected;
        self.schemas
    }

    /// Resolve a single additional schema reachable only from an endpoint
    /// (e.g. an inline request/response schema with no component name),
    /// returning its `SchemaRef` and folding any newly-discovered schemas
    /// into the running graph. Used by `endpoints.rs`.
    pub fn resolve_external(
        &mut self,
        name_hint: &str,
        refor: &ReferenceOr<openapiv3::Schema>,
    ) -> SchemaRef {
        self.resolve_ref(name_hint, refor)
    }

    /// Access the shared diagnostics report, for callers (`endpoints.rs`)
    /// that need to raise diagnostics while they hold this collector's
    /// only handle on it.
    pub fn report_mut(&mut self) -> &mut Report {
        self.report
    }

    fn resolve_named(&mut self, name: &str) -> SchemaRef {
        if self.schemas.contains_key(name) {
            return SchemaRef(name.to_string());
        }
        if self.in_progress.contains(name) {
            self.cycle_closures.insert(name.to_string());
            return SchemaRef(name.to_string());
        }
        let Some(refor) = self.components.get(name).cloned() else {
            self.report.reference_error(format!("dangling schema reference: {name}"), None);
            return SchemaRef(name.to_string());
        };
        match refor {
            ReferenceOr::Reference { reference } => match strip_schema_ref(&reference) {
                Some(target) => self.resolve_named(&target),
                None => {
                    self.report.warn(
                        format!("unsupported reference target: {reference}"),
                        Some(format!("components.schemas.{name}")),
                    );
                    SchemaRef(reference)
                }
            },
            ReferenceOr::Item(item) => {
                self.in_progress.insert(name.to_string());
                let mut schema = self.convert(name, &item);
                self.in_progress.remove(name);
                if self.cycle_closures.remove(name) {
                    schema.has_cycle = true;
                    self.cycles_detected += 1;
                }
                self.schemas.insert(name.to_string(), schema);
                SchemaRef(name.to_string())
            }
        }
    }

    fn resolve_ref(&mut self, name_hint: &str, refor: &ReferenceOr<openapiv3::Schema>) -> SchemaRef {
        match refor {
            ReferenceOr::Reference { reference } => match strip_schema_ref(reference) {
                Some(target) => self.resolve_named(&target),
                None => {
                    self.report
                        .warn(format!("unsupported reference target: {reference}"), None);
                    SchemaRef(reference.clone())
                }
            },
            ReferenceOr::Item(item) => self.resolve_inline(name_hint, item),
        }
    }

    fn resolve_boxed(
        &mut self,
        name_hint: &str,
        refor: &ReferenceOr<Box<openapiv3::Schema>>,
    ) -> SchemaRef {
        match refor {
            ReferenceOr::Reference { reference } => match strip_schema_ref(reference) {
                Some(target) => self.resolve_named(&target),
                None => {
                    self.report
                        .warn(format!("unsupported reference target: {reference}"), None);
                    SchemaRef(reference.clone())
                }
            },
            ReferenceOr::Item(item) => self.resolve_inline(name_hint, item),
        }
    }

    fn resolve_inline(&mut self, name_hint: &str, item: &openapiv3::Schema) -> SchemaRef {
        let name = if self.schemas.contains_key(name_hint) || self.in_progress.contains(name_hint)
        {
            self.anon_seq += 1;
            format!("{name_hint}#{}", self.anon_seq)
        } else {
            name_hint.to_string()
        };
        self.in_progress.insert(name.clone());
        let mut schema = self.convert(&name, item);
        self.in_progress.remove(&name);
        if self.cycle_closures.remove(&name) {
            schema.has_cycle = true;
            self.cycles_detected += 1;
        }
        self.schemas.insert(name.clone(), schema);
        SchemaRef(name)
    }

    fn resolve_many(
        &mut self,
        parent: &str,
        keyword: &str,
        items: &[ReferenceOr<openapiv3::Schema>],
    ) -> Vec<SchemaRef> {
        items
            .iter()
            .enumerate()
            .map(|(i, r)| self.resolve_ref(&format!("{parent}.{keyword}.{i}"), r))
            .collect()
    }

    fn convert(&mut self, name: &str, raw: &openapiv3::Schema) -> Schema {
        let data = &raw.schema_data;
        let mut schema = Schema {
            name: name.to_string(),
            schema_type: None,
            format: None,
            title: data.title.clone(),
            description: data.description.clone(),
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
            items: None,
            enum_values: Vec::new(),
            composition: Composition::default(),
            constraints: ValidationConstraints::default(),
            read_only: data.read_only,
            write_only: data.write_only,
            deprecated: data.deprecated,
            discriminator: data.discriminator.as_ref().map(|d| d.property_name.clone()),
            example: data.example.clone(),
            extensions: data.extensions.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            unknown_keywords: BTreeMap::new(),
            dependencies: BTreeSet::new(),
            reference_count: 0,
            has_cycle: false,
            searchable_text: String::new(),
            property_names: Vec::new(),
        };

        match &raw.schema_kind {
            openapiv3::SchemaKind::Type(openapiv3::Type::String(s)) => {
                schema.schema_type = Some(SchemaType::String);
                schema.format = string_format(&s.format);
                schema.constraints.pattern = s.pattern.clone();
                schema.constraints.min_length = s.min_length.map(|v| v as u64);
                schema.constraints.max_length = s.max_length.map(|v| v as u64);
                schema.enum_values =
                    s.enumeration.iter().map(|v| v.clone().map_or(Value::Null, Value::String)).collect();
            }
            openapiv3::SchemaKind::Type(openapiv3::Type::Number(n)) => {
                schema.schema_type = Some(SchemaType::Number);
                schema.format = number_format(&n.format);
                schema.constraints.minimum = n.minimum;
                schema.constraints.maximum = n.maximum;
                schema.enum_values = n.enumeration.iter().map(|v| v.map_or(Value::Null, |f| json!(f))).collect();
            }
            openapiv3::SchemaKind::Type(openapiv3::Type::Integer(i)) => {
                schema.schema_type = Some(SchemaType::Integer);
                schema.format = integer_format(&i.format);
                schema.constraints.minimum = i.minimum.map(|v| v as f64);
                schema.constraints.maximum = i.maximum.map(|v| v as f64);
                schema.enum_values = i.enumeration.iter().map(|v| v.map_or(Value::Null, |n| json!(n))).collect();
            }
            openapiv3::SchemaKind::Type(openapiv3::Type::Boolean(b)) => {
                schema.schema_type = Some(SchemaType::Boolean);
                schema.enum_values = b.enumeration.iter().map(|v| v.map_or(Value::Null, Value::Bool)).collect();
            }
            openapiv3::SchemaKind::Type(openapiv3::Type::Object(obj)) => {
                schema.schema_type = Some(SchemaType::Object);
                schema.required = obj.required.iter().cloned().collect();
                for (prop_name, prop_schema) in &obj.properties {
                    let child_name = format!("{name}.{prop_name}");
                    let schema_ref = self.resolve_boxed(&child_name, prop_schema);
                    schema.dependencies.insert(schema_ref.0.clone());
                    schema.properties.insert(prop_name.clone(), schema_ref);
                }
            }
            openapiv3::SchemaKind::Type(openapiv3::Type::Array(arr)) => {
                schema.schema_type = Some(SchemaType::Array);
                schema.constraints.min_items = arr.min_items.map(|v| v as u64);
                schema.constraints.max_items = arr.max_items.map(|v| v as u64);
                schema.constraints.unique_items = arr.unique_items;
                if let Some(items) = &arr.items {
                    let child_name = format!("{name}.items");
                    let schema_ref = self.resolve_boxed(&child_name, items);
                    schema.dependencies.insert(schema_ref.0.clone());
                    schema.items = Some(schema_ref);
                }
            }
            openapiv3::SchemaKind::AllOf { all_of } => {
                schema.composition.all_of = self.resolve_many(name, "allOf", all_of);
            }
            openapiv3::SchemaKind::OneOf { one_of } => {
                schema.composition.one_of = self.resolve_many(name, "oneOf", one_of);
            }
            openapiv3::SchemaKind::AnyOf { any_of } => {
                schema.composition.any_of = self.resolve_many(name, "anyOf", any_of);
            }
            openapiv3::SchemaKind::Not { not } => {
                let child_name = format!("{name}.not");
                schema.composition.not = Some(self.resolve_ref(&child_name, not));
            }
            _ => {
                // Free-form schema (openapiv3's `Any` variant): no type
                // constraint, nothing further to walk.
            }
        }

        for r in schema
            .composition
            .all_of
            .iter()
            .chain(&schema.composition.one_of)
            .chain(&schema.composition.any_of)
        {
            schema.dependencies.insert(r.0.clone());
        }
        if let Some(r) = &schema.composition.not {
            schema.dependencies.insert(r.0.clone());
        }

        schema
    }
}

/// Strip the `#/components/schemas/` prefix from a JSON pointer reference,
/// returning `None` for anything we don't treat as an internal schema ref
/// (external file references, parameter/response refs used in the wrong
/// slot, etc).
fn strip_schema_ref(reference: &str) -> Option<String> {
    reference.strip_prefix("#/components/schemas/").map(str::to_string)
}

fn string_format(format: &VariantOrUnknownOrEmpty<openapiv3::StringFormat>) -> Option<String> {
    match format {
        VariantOrUnknownOrEmpty::Item(openapiv3::StringFormat::Date) => Some("date".to_string()),
        VariantOrUnknownOrEmpty::Item(openapiv3::StringFormat::DateTime) => {
            Some("date-time".to_string())
        }
        VariantOrUnknownOrEmpty::Item(openapiv3::StringFormat::Password) => {
            Some("password".to_string())
        }
        VariantOrUnknownOrEmpty::Item(openapiv3::StringFormat::Byte) => Some("byte".to_string()),
        VariantOrUnknownOrEmpty::Item(openapiv3::StringFormat::Binary) => {
            Some("binary".to_string())
        }
        VariantOrUnknownOrEmpty::Unknown(s) => Some(s.clone()),
        VariantOrUnknownOrEmpty::Empty => None,
    }
}

fn number_format(format: &VariantOrUnknownOrEmpty<openapiv3::NumberFormat>) -> Option<String> {
    match format {
        VariantOrUnknownOrEmpty::Item(openapiv3::NumberFormat::Float) => Some("float".to_string()),
        VariantOrUnknownOrEmpty::Item(openapiv3::NumberFormat::Double) => {
            Some("double".to_string())
        }
        VariantOrUnknownOrEmpty::Unknown(s) => Some(s.clone()),
        VariantOrUnknownOrEmpty::Empty => None,
    }
}

fn integer_format(format: &VariantOrUnknownOrEmpty<openapiv3::IntegerFormat>) -> Option<String> {
    match format {
        VariantOrUnknownOrEmpty::Item(openapiv3::IntegerFormat::Int32) => {
            Some("int32".to_string())
        }
        VariantOrUnknownOrEmpty::Item(openapiv3::IntegerFormat::Int64) => {
            Some("int64".to_string())
        }
        VariantOrUnknownOrEmpty::Unknown(s) => Some(s.clone()),
        VariantOrUnknownOrEmpty::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapiv3::{ObjectType, Schema, SchemaData, SchemaKind, StringType, Type};

    fn string_schema() -> ReferenceOr<Schema> {
        ReferenceOr::Item(Schema {
            schema_data: SchemaData::default(),
            schema_kind: SchemaKind::Type(Type::String(StringType::default())),
        })
    }

    #[test]
    fn resolves_named_schema() {
        let mut components = IndexMap::new();
        components.insert("Pet".to_string(), string_schema());
        let mut report = Report::default();
        let schemas = SchemaCollector::new(&components, &mut report).collect();
        assert!(schemas.contains_key("Pet"));
        assert_eq!(schemas["Pet"].schema_type, Some(SchemaType::String));
    }

    #[test]
    fn detects_self_referencing_cycle() {
        let mut components = IndexMap::new();
        let mut props = indexmap::IndexMap::new();
        props.insert(
            "parent".to_string(),
            ReferenceOr::Reference { reference: "#/components/schemas/Node".to_string() },
        );
        components.insert(
            "Node".to_string(),
            ReferenceOr::Item(Schema {
                schema_data: SchemaData::default(),
                schema_kind: SchemaKind::Type(Type::Object(ObjectType {
                    properties: props,
                    ..ObjectType::default()
                })),
            }),
        );
        let mut report = Report::default();
        let schemas = SchemaCollector::new(&components, &mut report).collect();
        assert!(schemas["Node"].has_cycle);
        assert_eq!(report.counters.cycles_detected, 1);
    }

    #[test]
    fn dangling_reference_is_reported_as_an_error() {
        let components = IndexMap::new();
        let mut report = Report::default();
        let mut collector = SchemaCollector::new(&components, &mut report);
        let schema_ref = collector.resolve_named("Missing");
        assert_eq!(schema_ref.0, "Missing");
        drop(collector);
        assert!(report.has_errors());
    }

    #[test]
    fn inline_schemas_get_a_synthetic_dotted_name() {
        let mut components = IndexMap::new();
        let mut props = indexmap::IndexMap::new();
        props.insert(
            "address".to_string(),
            ReferenceOr::Item(Box::new(Schema {
                schema_data: SchemaData::default(),
                schema_kind: SchemaKind::Type(Type::Object(ObjectType::default())),
            })),
        );
        components.insert(
            "User".to_string(),
            ReferenceOr::Item(Schema {
                schema_data: SchemaData::default(),
                schema_kind: SchemaKind::Type(Type::Object(ObjectType {
                    properties: props,
                    ..ObjectType::default()
                })),
            }),
        );
        let mut report = Report::default();
        let schemas = SchemaCollector::new(&components, &mut report).collect();
        assert!(schemas.contains_key("User.address"));
        assert_eq!(schemas["User"].properties["address"].0, "User.address");
    }
}
