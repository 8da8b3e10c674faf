// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::error::Details;
use crate::json;
use crate::schema::name::validate_enum_symbol_name;
use crate::schema::{
    Aliases, ArraySchema, CodecOptions, EnumSchema, FixedSchema, LogicalSchema, LogicalType,
    MapSchema, Name, NamespaceRef, NodeId, RecordField, RecordSchema, RefSchema, Schema,
    SchemaKind, SchemaNode, UnionSchema,
};
use crate::util::MapHelper;
use crate::{AvroResult, Error};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Builds the node arena of a [`Schema`].
///
/// Parsing happens in two passes. The first one walks the JSON definition, pushing one node per
/// type and a [`SchemaNode::Ref`] for every use of a named type by name. The second one points
/// every reference at its definition, which makes forward and recursive references work, and
/// then checks the rules that need the whole schema: union members and field defaults.
#[derive(Default)]
pub(crate) struct Parser {
    nodes: Vec<SchemaNode>,
    /// Definitions of named types
    names: HashMap<Name, NodeId>,
    /// Aliases of named types, used when a reference matches no definition
    aliases: HashMap<Name, NodeId>,
    references: Vec<NodeId>,
    unions: Vec<NodeId>,
}

impl Parser {
    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro schema.
    pub(super) fn parse_schema(mut self, value: &Value, options: CodecOptions) -> AvroResult<Schema> {
        let root = self.parse(value, None)?;
        self.resolve_references()?;

        let mut schema = Schema {
            nodes: self.nodes,
            root,
            names: self.names,
            permissive: options.permissive,
        };

        for union in &self.unions {
            if let SchemaNode::Union(union_schema) = schema.node(*union) {
                union_schema.check_variants(&schema)?;
            }
        }

        resolve_defaults(&mut schema)?;

        debug!(
            "Parsed schema with {} nodes and {} named types",
            schema.nodes.len(),
            schema.names.len()
        );
        Ok(schema)
    }

    fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Parse a schema found anywhere in the definition.
    pub(crate) fn parse(
        &mut self,
        value: &Value,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        match *value {
            Value::String(ref t) => self.parse_known_schema(t.as_str(), enclosing_namespace),
            Value::Object(ref data) => self.parse_complex(data, enclosing_namespace),
            Value::Array(ref data) => self.parse_union(data, enclosing_namespace),
            _ => Err(Details::ParseSchemaFromValidJson.into()),
        }
    }

    /// Parse a string as a primitive type or reference to a named type.
    fn parse_known_schema(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        let node = match name {
            "null" => SchemaNode::Null,
            "boolean" => SchemaNode::Boolean,
            "int" => SchemaNode::Int,
            "long" => SchemaNode::Long,
            "double" => SchemaNode::Double,
            "float" => SchemaNode::Float,
            "bytes" => SchemaNode::Bytes,
            "string" => SchemaNode::String,
            _ => return self.parse_reference(name, enclosing_namespace),
        };
        Ok(self.push(node))
    }

    /// Record a use of a named type. The target is filled in by `resolve_references`.
    fn parse_reference(
        &mut self,
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        // For good error reporting we add this check
        match name {
            "record" | "enum" | "fixed" | "array" | "map" => {
                return Err(Details::InvalidSchemaRecord(name.to_string()).into());
            }
            _ => (),
        }

        let name = Name::new_with_enclosing_namespace(name, enclosing_namespace)?;
        let id = self.push(SchemaNode::Ref(RefSchema {
            name,
            target: NodeId::UNRESOLVED,
        }));
        self.references.push(id);
        Ok(id)
    }

    /// Parse a `serde_json::Value` representing a complex Avro type.
    ///
    /// Avro supports "recursive" definition of types.
    /// e.g: `{"type": {"type": "string"}}`
    fn parse_complex(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        match complex.get("logicalType") {
            Some(Value::String(logical_type)) => {
                let inner = self.parse_native_complex(complex, enclosing_namespace)?;
                match self.logical_type(logical_type, complex, inner) {
                    Some(logical_type) => Ok(self.push(SchemaNode::Logical(LogicalSchema {
                        logical_type,
                        inner,
                    }))),
                    None => Ok(inner),
                }
            }
            Some(value) => Err(Details::GetLogicalTypeFieldType(value.clone()).into()),
            None => self.parse_native_complex(complex, enclosing_namespace),
        }
    }

    fn parse_native_complex(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        match complex.get("type") {
            Some(Value::String(t)) => match t.as_str() {
                "record" => self.parse_record(complex, enclosing_namespace),
                "enum" => self.parse_enum(complex, enclosing_namespace),
                "array" => self.parse_array(complex, enclosing_namespace),
                "map" => self.parse_map(complex, enclosing_namespace),
                "fixed" => self.parse_fixed(complex, enclosing_namespace),
                other => self.parse_known_schema(other, enclosing_namespace),
            },
            Some(Value::Object(data)) => self.parse_complex(data, enclosing_namespace),
            Some(Value::Array(variants)) => self.parse_union(variants, enclosing_namespace),
            Some(unknown) => Err(Details::GetComplexType(unknown.clone()).into()),
            None => Err(Details::GetComplexTypeField.into()),
        }
    }

    /// The kind of `id`, looking through references to types that are already defined.
    fn kind_of(&self, id: NodeId) -> Option<(SchemaKind, Option<usize>)> {
        let node = match &self.nodes[id.0] {
            SchemaNode::Ref(RefSchema { name, .. }) => &self.nodes[self.names.get(name)?.0],
            node => node,
        };
        let size = match node {
            SchemaNode::Fixed(FixedSchema { size, .. }) => Some(*size),
            _ => None,
        };
        Some((SchemaKind::from(node), size))
    }

    /// Checks whether `logical_type` can annotate `inner`.
    ///
    /// Unknown logical types and logical types on the wrong underlying type are ignored, and the
    /// underlying type is used as is.
    fn logical_type(
        &self,
        logical_type: &str,
        complex: &Map<String, Value>,
        inner: NodeId,
    ) -> Option<LogicalType> {
        let Some((kind, size)) = self.kind_of(inner) else {
            warn!("Ignoring logical type '{logical_type}' on a type that is not defined yet");
            return None;
        };

        let (candidate, supported): (LogicalType, &[SchemaKind]) = match logical_type {
            "decimal" => match parse_precision_and_scale(complex, size) {
                Ok((precision, scale)) => (
                    LogicalType::Decimal { precision, scale },
                    &[SchemaKind::Bytes, SchemaKind::Fixed],
                ),
                Err(reason) => {
                    warn!("Ignoring invalid decimal logical type: {reason}");
                    return None;
                }
            },
            "big-decimal" => (LogicalType::BigDecimal, &[SchemaKind::Bytes]),
            "uuid" => (LogicalType::Uuid, &[SchemaKind::String, SchemaKind::Fixed]),
            "date" => (LogicalType::Date, &[SchemaKind::Int]),
            "time-millis" => (LogicalType::TimeMillis, &[SchemaKind::Int]),
            "time-micros" => (LogicalType::TimeMicros, &[SchemaKind::Long]),
            "timestamp-millis" => (LogicalType::TimestampMillis, &[SchemaKind::Long]),
            "timestamp-micros" => (LogicalType::TimestampMicros, &[SchemaKind::Long]),
            "timestamp-nanos" => (LogicalType::TimestampNanos, &[SchemaKind::Long]),
            "local-timestamp-millis" => (LogicalType::LocalTimestampMillis, &[SchemaKind::Long]),
            "local-timestamp-micros" => (LogicalType::LocalTimestampMicros, &[SchemaKind::Long]),
            "local-timestamp-nanos" => (LogicalType::LocalTimestampNanos, &[SchemaKind::Long]),
            "duration" => (LogicalType::Duration, &[SchemaKind::Fixed]),
            // In this case, of an unknown logical type, we just pass through the underlying
            // type.
            _ => {
                debug!("Ignoring unknown logical type '{logical_type}'");
                return None;
            }
        };

        if !supported.contains(&kind) {
            warn!("Ignoring logical type '{logical_type}' for schema of type: {kind}!");
            return None;
        }

        match (candidate, size) {
            (LogicalType::Uuid, Some(size)) if size != 16 => {
                warn!("Ignoring uuid logical type for a Fixed schema because its size ({size}) is not 16!");
                None
            }
            (LogicalType::Duration, Some(size)) if size != 12 => {
                warn!(
                    "Ignoring duration logical type on fixed type because size ({size}) is not 12!"
                );
                None
            }
            (candidate, _) => Some(candidate),
        }
    }

    fn register_name(&mut self, name: &Name, aliases: &Aliases, id: NodeId) -> AvroResult<()> {
        if self.names.insert(name.clone(), id).is_some() {
            return Err(Details::AmbiguousSchemaDefinition(name.clone()).into());
        }
        if let Some(aliases) = aliases {
            for alias in aliases {
                self.aliases.insert(alias.clone(), id);
            }
        }
        Ok(())
    }

    /// Parse a `serde_json::Value` representing an Avro record type.
    fn parse_record(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        let aliases = fix_aliases_namespace(complex.aliases(), fully_qualified_name.namespace())?;

        // The slot is taken before the fields are parsed so the record precedes its fields
        let id = self.push(SchemaNode::Null);
        self.register_name(&fully_qualified_name, &aliases, id)?;

        debug!("Going to parse record schema: {:?}", &fully_qualified_name);

        let fields: Vec<RecordField> = complex
            .get("fields")
            .and_then(|fields| fields.as_array())
            .ok_or_else(|| Error::new(Details::GetRecordFieldsJson))
            .and_then(|fields| {
                fields
                    .iter()
                    .enumerate()
                    .map(|(position, field)| {
                        field
                            .as_object()
                            .ok_or_else(|| Error::new(Details::GetRecordFieldsJson))
                            .and_then(|field| {
                                RecordField::parse(field, position, self, &fully_qualified_name)
                            })
                    })
                    .collect::<Result<_, _>>()
            })?;

        let mut lookup = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            if let Some(_old) = lookup.insert(field.name.clone(), position) {
                return Err(Details::FieldNameDuplicate(field.name.clone()).into());
            }
        }
        for (position, field) in fields.iter().enumerate() {
            for alias in &field.aliases {
                lookup.entry(alias.clone()).or_insert(position);
            }
        }

        self.nodes[id.0] = SchemaNode::Record(RecordSchema {
            name: fully_qualified_name,
            aliases,
            doc: complex.doc(),
            fields,
            lookup,
            attributes: get_custom_attributes(complex, &["fields"]),
        });
        Ok(id)
    }

    /// Parse a `serde_json::Value` representing a Avro enum type.
    fn parse_enum(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        let aliases = fix_aliases_namespace(complex.aliases(), fully_qualified_name.namespace())?;

        let symbols: Vec<String> = complex
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::from(Details::GetEnumSymbolsField))
            .and_then(|symbols| {
                symbols
                    .iter()
                    .map(|symbol| symbol.as_str().map(|s| s.to_string()))
                    .collect::<Option<_>>()
                    .ok_or_else(|| Error::from(Details::GetEnumSymbols))
            })?;

        let mut existing_symbols: HashSet<&String> = HashSet::with_capacity(symbols.len());
        for symbol in symbols.iter() {
            validate_enum_symbol_name(symbol)?;

            // Ensure there are no duplicate symbols
            if !existing_symbols.insert(symbol) {
                return Err(Details::EnumSymbolDuplicate(symbol.to_string()).into());
            }
        }

        let default = match complex.get("default") {
            Some(Value::String(s)) if symbols.contains(s) => Some(s.clone()),
            Some(Value::String(s)) => {
                return Err(Details::GetEnumDefault {
                    symbol: s.clone(),
                    symbols,
                }
                .into());
            }
            Some(value) => return Err(Details::EnumDefaultWrongType(value.clone()).into()),
            None => None,
        };

        let id = self.push(SchemaNode::Enum(EnumSchema {
            name: fully_qualified_name.clone(),
            aliases: aliases.clone(),
            doc: complex.doc(),
            symbols,
            default,
            attributes: get_custom_attributes(complex, &["symbols", "default"]),
        }));
        self.register_name(&fully_qualified_name, &aliases, id)?;
        Ok(id)
    }

    /// Parse a `serde_json::Value` representing a Avro array type.
    fn parse_array(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        let items = complex
            .get("items")
            .ok_or_else(|| Details::GetArrayItemsField.into())
            .and_then(|items| self.parse(items, enclosing_namespace))?;
        Ok(self.push(SchemaNode::Array(ArraySchema {
            items,
            attributes: get_custom_attributes(complex, &["items"]),
        })))
    }

    /// Parse a `serde_json::Value` representing a Avro map type.
    fn parse_map(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        let values = complex
            .get("values")
            .ok_or_else(|| Details::GetMapValuesField.into())
            .and_then(|values| self.parse(values, enclosing_namespace))?;
        Ok(self.push(SchemaNode::Map(MapSchema {
            values,
            attributes: get_custom_attributes(complex, &["values"]),
        })))
    }

    /// Parse a `serde_json::Value` representing a Avro union type.
    fn parse_union(
        &mut self,
        items: &[Value],
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        if items.is_empty() {
            return Err(Details::EmptyUnion.into());
        }
        if items.len() == 1 {
            warn!("Union schema with just one member! Consider dropping the union!");
        }
        let variants = items
            .iter()
            .map(|v| self.parse(v, enclosing_namespace))
            .collect::<Result<Vec<_>, _>>()?;
        let id = self.push(SchemaNode::Union(UnionSchema::new(variants)));
        self.unions.push(id);
        Ok(id)
    }

    /// Parse a `serde_json::Value` representing a Avro fixed type.
    fn parse_fixed(
        &mut self,
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<NodeId> {
        let size = match complex.get("size") {
            Some(size) => size
                .as_u64()
                .and_then(|size| usize::try_from(size).ok())
                .ok_or_else(|| Details::GetFixedSizeFieldPositive(size.clone())),
            None => Err(Details::GetFixedSizeField),
        }?;

        let fully_qualified_name = Name::parse(complex, enclosing_namespace)?;
        let aliases = fix_aliases_namespace(complex.aliases(), fully_qualified_name.namespace())?;

        let id = self.push(SchemaNode::Fixed(FixedSchema {
            name: fully_qualified_name.clone(),
            aliases: aliases.clone(),
            doc: complex.doc(),
            size,
            attributes: get_custom_attributes(complex, &["size"]),
        }));
        self.register_name(&fully_qualified_name, &aliases, id)?;
        Ok(id)
    }

    /// Points every reference at the definition of the type it names.
    fn resolve_references(&mut self) -> AvroResult<()> {
        for &id in &self.references {
            let SchemaNode::Ref(reference) = &self.nodes[id.0] else {
                continue;
            };
            let target = self
                .names
                .get(&reference.name)
                .or_else(|| self.aliases.get(&reference.name))
                .copied();
            match target {
                Some(target) => {
                    if let SchemaNode::Ref(reference) = &mut self.nodes[id.0] {
                        reference.target = target;
                    }
                }
                None if reference.name.fullname() == "bool" => {
                    return Err(Details::ParsePrimitiveSimilar("bool".to_string(), "boolean").into());
                }
                None => return Err(Details::SchemaResolutionError(reference.name.clone()).into()),
            }
        }
        Ok(())
    }
}

/// Converts the `default` of every record field to a value of the field's schema.
///
/// Defaults use the JSON encoding, except that a union default is not wrapped in an object and
/// may match any member; the first member it fits is used.
fn resolve_defaults(schema: &mut Schema) -> AvroResult<()> {
    let mut resolved = Vec::new();
    for (index, node) in schema.nodes.iter().enumerate() {
        let SchemaNode::Record(record) = node else {
            continue;
        };
        for (position, field) in record.fields.iter().enumerate() {
            let Some(default) = &field.default else {
                continue;
            };
            let value = json::default_value(schema, field.schema, default).map_err(|e| {
                Details::GetDefaultRecordField {
                    field: field.name.clone(),
                    record: record.name.fullname().to_string(),
                    reason: e.to_string(),
                }
            })?;
            resolved.push((index, position, value));
        }
    }

    for (index, position, value) in resolved {
        if let SchemaNode::Record(record) = &mut schema.nodes[index] {
            record.fields[position].default_value = Some(value);
        }
    }
    Ok(())
}

fn get_custom_attributes(
    complex: &Map<String, Value>,
    excluded: &[&'static str],
) -> BTreeMap<String, Value> {
    let mut custom_attributes: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in complex {
        match key.as_str() {
            "type" | "name" | "namespace" | "doc" | "aliases" | "logicalType" => continue,
            "precision" | "scale" if complex.contains_key("logicalType") => continue,
            candidate if excluded.contains(&candidate) => continue,
            _ => custom_attributes.insert(key.clone(), value.clone()),
        };
    }
    custom_attributes
}

// A type alias may be specified either as a fully namespace-qualified, or relative
// to the namespace of the name it is an alias for. For example, if a type named "a.b"
// has aliases of "c" and "x.y", then the fully qualified names of its aliases are "a.c"
// and "x.y".
// https://avro.apache.org/docs/++version++/specification/#aliases
fn fix_aliases_namespace(aliases: Option<Vec<String>>, namespace: NamespaceRef) -> AvroResult<Aliases> {
    aliases
        .map(|aliases| {
            aliases
                .iter()
                .map(|alias| Name::new_with_enclosing_namespace(alias, namespace))
                .collect::<AvroResult<Vec<_>>>()
        })
        .transpose()
}

/// Reads `precision` and `scale` of a decimal. A fixed of `size` bytes bounds the precision.
fn parse_precision_and_scale(
    complex: &Map<String, Value>,
    size: Option<usize>,
) -> Result<(usize, usize), String> {
    fn get_decimal_integer(complex: &Map<String, Value>, key: &str) -> Result<Option<usize>, String> {
        match complex.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| format!("`{key}` must be a non-negative integer, got {value}")),
        }
    }

    let precision = get_decimal_integer(complex, "precision")?
        .ok_or_else(|| "`precision` is missing".to_string())?;
    let scale = get_decimal_integer(complex, "scale")?.unwrap_or(0);

    if precision < 1 {
        return Err(format!("precision must be positive, got {precision}"));
    }
    if precision < scale {
        return Err(format!(
            "precision ({precision}) must not be less than scale ({scale})"
        ));
    }
    if let Some(size) = size {
        let max_precision = max_precision_for_fixed(size);
        if precision > max_precision {
            return Err(format!(
                "a fixed of {size} bytes holds at most {max_precision} digits, got precision {precision}"
            ));
        }
    }
    Ok((precision, scale))
}

/// floor(log10(2^(8 * size - 1) - 1))
fn max_precision_for_fixed(size: usize) -> usize {
    match size.checked_mul(8) {
        Some(0) => 0,
        Some(bits) => ((bits - 1) as f64 * 2f64.log10()).floor() as usize,
        // too large to bound any precision
        None => usize::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_max_precision_for_fixed() {
        assert_eq!(max_precision_for_fixed(0), 0);
        assert_eq!(max_precision_for_fixed(1), 2);
        assert_eq!(max_precision_for_fixed(2), 4);
        assert_eq!(max_precision_for_fixed(16), 38);
        assert_eq!(max_precision_for_fixed(usize::MAX / 4), usize::MAX);
    }

    #[test]
    fn test_fix_aliases_namespace() -> TestResult {
        let aliases = fix_aliases_namespace(
            Some(vec!["c".to_string(), "x.y".to_string()]),
            Some("a"),
        )?
        .unwrap_or_default();
        let fullnames = aliases.iter().map(Name::fullname).collect::<Vec<_>>();
        assert_eq!(fullnames, vec!["a.c", "x.y"]);
        Ok(())
    }

    #[test]
    fn test_record_precedes_its_fields() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int"}]}"#,
        )?;
        assert_eq!(schema.root_id(), NodeId(0));
        assert!(matches!(schema.node(NodeId(1)), SchemaNode::Int));
        Ok(())
    }

    #[test]
    fn test_reserved_words_are_not_references() {
        for raw in [r#""record""#, r#""fixed""#, r#"{"type": "enum"}"#] {
            assert!(
                matches!(
                    Schema::parse_str(raw).map_err(Error::into_details),
                    Err(Details::InvalidSchemaRecord(_)) | Err(Details::GetNameField)
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_custom_attributes() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "map", "values": "long", "java-class": "java.util.HashMap"}"#,
        )?;
        let SchemaNode::Map(map) = schema.root() else {
            panic!("Expected a map schema");
        };
        assert_eq!(
            map.attributes.get("java-class"),
            Some(&Value::String("java.util.HashMap".into()))
        );
        Ok(())
    }
}
