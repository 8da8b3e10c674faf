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

//! Logic for parsing and interacting with schemas in Avro format.
//!
//! A [`Schema`] owns every node of the parsed definition in a single arena. Nodes refer to
//! each other through [`NodeId`]s, and references to named types are [`SchemaNode::Ref`] nodes
//! that already point at the definition, so recursive types need no lookups after parsing.

mod name;
mod parser;
mod record;
mod union;

pub use crate::schema::{
    name::{Aliases, Name, Namespace, NamespaceRef},
    record::{RecordField, RecordFieldOrder, RecordSchema},
    union::UnionSchema,
};
use crate::{
    AvroResult,
    error::Details,
    json,
    schema::parser::Parser,
    schema_equality,
    types::Value,
    validator,
};
use digest::Digest;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    str::FromStr,
};
use strum_macros::EnumDiscriminants;

/// Represents documentation for complex Avro schemas.
pub type Documentation = Option<String>;

/// Represents an Avro schema fingerprint.
///
/// More information about Avro schema fingerprints can be found in the
/// [Avro Schema Fingerprint documentation](https://avro.apache.org/docs/++version++/specification/#schema-fingerprints)
pub struct SchemaFingerprint {
    pub bytes: Vec<u8>,
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.bytes
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<String>>()
                .join("")
        )
    }
}

/// Handle of a node inside a [`Schema`].
///
/// A `NodeId` is only meaningful for the schema that handed it out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) const UNRESOLVED: NodeId = NodeId(usize::MAX);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Represents any valid Avro schema node
/// More information about Avro schemas can be found in the
/// [Avro Specification](https://avro.apache.org/docs/++version++/specification/#schema-declaration)
#[derive(Clone, Debug, EnumDiscriminants)]
#[strum_discriminants(name(SchemaKind), derive(Hash, Ord, PartialOrd))]
pub enum SchemaNode {
    /// A `null` Avro schema.
    Null,
    /// A `boolean` Avro schema.
    Boolean,
    /// An `int` Avro schema.
    Int,
    /// A `long` Avro schema.
    Long,
    /// A `float` Avro schema.
    Float,
    /// A `double` Avro schema.
    Double,
    /// A `bytes` Avro schema.
    ///
    /// `Bytes` represents a sequence of 8-bit unsigned bytes.
    Bytes,
    /// A `string` Avro schema.
    ///
    /// `String` represents a unicode character sequence.
    String,
    /// An `array` Avro schema.
    ///
    /// All items will have the same schema.
    Array(ArraySchema),
    /// A `map` Avro schema.
    ///
    /// Keys are always strings and all values will have the same schema.
    Map(MapSchema),
    /// A `union` Avro schema.
    Union(UnionSchema),
    /// A `record` Avro schema.
    Record(RecordSchema),
    /// An `enum` Avro schema.
    Enum(EnumSchema),
    /// A `fixed` Avro schema.
    Fixed(FixedSchema),
    /// A reference to a named type defined elsewhere in the schema.
    Ref(RefSchema),
    /// A logical type annotating another node.
    Logical(LogicalSchema),
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Int => "int",
            SchemaKind::Long => "long",
            SchemaKind::Float => "float",
            SchemaKind::Double => "double",
            SchemaKind::Bytes => "bytes",
            SchemaKind::String => "string",
            SchemaKind::Array => "array",
            SchemaKind::Map => "map",
            SchemaKind::Union => "union",
            SchemaKind::Record => "record",
            SchemaKind::Enum => "enum",
            SchemaKind::Fixed => "fixed",
            SchemaKind::Ref => "ref",
            SchemaKind::Logical => "logical",
        };
        f.write_str(name)
    }
}

/// A description of an Array schema.
#[derive(Clone, Debug)]
pub struct ArraySchema {
    pub items: NodeId,
    pub attributes: BTreeMap<String, JsonValue>,
}

/// A description of a Map schema.
#[derive(Clone, Debug)]
pub struct MapSchema {
    pub values: NodeId,
    pub attributes: BTreeMap<String, JsonValue>,
}

/// A description of an Enum schema.
#[derive(Clone, Debug)]
pub struct EnumSchema {
    /// The name of the schema
    pub name: Name,
    /// The aliases of the schema
    pub aliases: Aliases,
    /// The documentation of the schema
    pub doc: Documentation,
    /// The set of symbols of the schema
    pub symbols: Vec<String>,
    /// An optional default symbol used for compatibility
    pub default: Option<String>,
    /// The custom attributes of the schema
    pub attributes: BTreeMap<String, JsonValue>,
}

impl EnumSchema {
    /// Position of `symbol` among the declared symbols.
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

/// A description of a Fixed schema.
#[derive(Clone, Debug)]
pub struct FixedSchema {
    /// The name of the schema
    pub name: Name,
    /// The aliases of the schema
    pub aliases: Aliases,
    /// The documentation of the schema
    pub doc: Documentation,
    /// The size of the fixed schema
    pub size: usize,
    /// The custom attributes of the schema
    pub attributes: BTreeMap<String, JsonValue>,
}

/// A reference to a named type, resolved when the schema is parsed.
#[derive(Clone, Debug)]
pub struct RefSchema {
    pub name: Name,
    /// The `record`, `enum` or `fixed` node this reference points at.
    pub target: NodeId,
}

/// A logical type together with the node it annotates.
#[derive(Clone, Debug)]
pub struct LogicalSchema {
    pub logical_type: LogicalType,
    pub inner: NodeId,
}

/// The logical types understood by this crate.
///
/// Values of a logical type are encoded exactly like their underlying type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// `bytes` or `fixed`.
    Decimal { precision: usize, scale: usize },
    /// `bytes`.
    BigDecimal,
    /// `string` or `fixed` of size 16.
    Uuid,
    /// `int`.
    Date,
    /// `int`.
    TimeMillis,
    /// `long`.
    TimeMicros,
    /// `long`.
    TimestampMillis,
    /// `long`.
    TimestampMicros,
    /// `long`.
    TimestampNanos,
    /// `long`.
    LocalTimestampMillis,
    /// `long`.
    LocalTimestampMicros,
    /// `long`.
    LocalTimestampNanos,
    /// `fixed` of size 12.
    Duration,
}

impl LogicalType {
    /// The value of the `logicalType` attribute.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Decimal { .. } => "decimal",
            LogicalType::BigDecimal => "big-decimal",
            LogicalType::Uuid => "uuid",
            LogicalType::Date => "date",
            LogicalType::TimeMillis => "time-millis",
            LogicalType::TimeMicros => "time-micros",
            LogicalType::TimestampMillis => "timestamp-millis",
            LogicalType::TimestampMicros => "timestamp-micros",
            LogicalType::TimestampNanos => "timestamp-nanos",
            LogicalType::LocalTimestampMillis => "local-timestamp-millis",
            LogicalType::LocalTimestampMicros => "local-timestamp-micros",
            LogicalType::LocalTimestampNanos => "local-timestamp-nanos",
            LogicalType::Duration => "duration",
        }
    }
}

/// Options fixed when a [`Schema`] is constructed.
#[derive(bon::Builder, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Accept scalar to scalar coercions on top of the strict matching rules.
    #[builder(default)]
    pub permissive: bool,
}

/// A parsed Avro schema.
///
/// It is immutable once built and can be shared between threads.
#[derive(Clone, Debug)]
pub struct Schema {
    pub(crate) nodes: Vec<SchemaNode>,
    pub(crate) root: NodeId,
    pub(crate) names: HashMap<Name, NodeId>,
    pub(crate) permissive: bool,
}

impl Schema {
    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(input: &str) -> AvroResult<Schema> {
        Self::parse_str_with_options(input, CodecOptions::default())
    }

    /// Create a `Schema` from a string representing a JSON Avro schema, with the given options.
    pub fn parse_str_with_options(input: &str, options: CodecOptions) -> AvroResult<Schema> {
        let value = serde_json::from_str(input).map_err(Details::ParseSchemaJson)?;
        Self::parse_with_options(&value, options)
    }

    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro
    /// schema.
    pub fn parse(value: &JsonValue) -> AvroResult<Schema> {
        Self::parse_with_options(value, CodecOptions::default())
    }

    /// Create a `Schema` from a `serde_json::Value`, with the given options.
    pub fn parse_with_options(value: &JsonValue, options: CodecOptions) -> AvroResult<Schema> {
        Parser::default().parse_schema(value, options)
    }

    /// The root node.
    pub fn root(&self) -> &SchemaNode {
        self.node(self.root)
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` was not handed out by this schema.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Follows a reference to the definition it points at.
    pub fn resolve(&self, id: NodeId) -> NodeId {
        match self.node(id) {
            SchemaNode::Ref(RefSchema { target, .. }) => *target,
            _ => id,
        }
    }

    /// Follows references and strips logical annotations, returning the node that decides the
    /// encoding.
    pub fn underlying(&self, mut id: NodeId) -> NodeId {
        loop {
            match self.node(id) {
                SchemaNode::Ref(RefSchema { target, .. }) => id = *target,
                SchemaNode::Logical(LogicalSchema { inner, .. }) => id = *inner,
                _ => return id,
            }
        }
    }

    /// The kind of the node deciding the encoding of the root.
    pub fn kind(&self) -> SchemaKind {
        self.kind_of(self.root)
    }

    pub fn kind_of(&self, id: NodeId) -> SchemaKind {
        SchemaKind::from(self.node(self.underlying(id)))
    }

    /// The logical type of a node, if it has one.
    pub fn logical_type(&self, id: NodeId) -> Option<LogicalType> {
        match self.node(self.resolve(id)) {
            SchemaNode::Logical(LogicalSchema { logical_type, .. }) => Some(*logical_type),
            _ => None,
        }
    }

    /// Look up a named type by its full name.
    pub fn named(&self, fullname: &str) -> Option<NodeId> {
        let name = Name::new(fullname).ok()?;
        self.names.get(&name).copied()
    }

    /// The names of all named types defined in this schema.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.names.keys()
    }

    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// The name identifying `id` as a union branch: the primitive type name, `array`, `map` or
    /// the full name of a named type.
    pub fn type_name(&self, id: NodeId) -> Cow<'_, str> {
        match self.node(self.underlying(id)) {
            SchemaNode::Record(RecordSchema { name, .. })
            | SchemaNode::Enum(EnumSchema { name, .. })
            | SchemaNode::Fixed(FixedSchema { name, .. }) => Cow::Borrowed(name.fullname()),
            node => Cow::Owned(SchemaKind::from(node).to_string()),
        }
    }

    /// Whether `value` can be encoded with this schema.
    pub fn can_encode(&self, value: &Value) -> bool {
        validator::can_encode(self, self.root, value)
    }

    /// Like [`can_encode`](Self::can_encode), reporting the first mismatch as an error.
    pub fn validate(&self, value: &Value) -> AvroResult<()> {
        validator::validate(self, self.root, value)
    }

    /// Encode `value` in the Avro binary format.
    pub fn binary_encode(&self, value: &Value) -> AvroResult<Vec<u8>> {
        crate::encode_to_vec(value, self)
    }

    /// Decode a single datum from the Avro binary format. The whole input must be consumed.
    pub fn binary_decode(&self, bytes: &[u8]) -> AvroResult<Value> {
        crate::decode(self, bytes)
    }

    /// Encode `value` in the Avro JSON format.
    pub fn json_encode(&self, value: &Value) -> AvroResult<String> {
        json::to_json_string(value, self)
    }

    /// Decode a datum from the Avro JSON format.
    pub fn json_decode(&self, text: &str) -> AvroResult<Value> {
        json::from_json_str(self, text)
    }

    /// Converts `self` into its [Parsing Canonical Form].
    ///
    /// [Parsing Canonical Form]:
    /// https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas
    pub fn canonical_form(&self) -> String {
        let json = self.node_to_json(self.root, None, true);
        parsing_canonical_form(&json, &mut HashSet::new())
    }

    /// Generate [fingerprint] of Schema's [Parsing Canonical Form].
    ///
    /// [Parsing Canonical Form]:
    /// https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas
    /// [fingerprint]:
    /// https://avro.apache.org/docs/current/specification/#schema-fingerprints
    pub fn fingerprint<D: Digest>(&self) -> SchemaFingerprint {
        let mut d = D::new();
        d.update(self.canonical_form());
        SchemaFingerprint {
            bytes: d.finalize().to_vec(),
        }
    }

    /// The JSON definition of this schema.
    ///
    /// Every named type is written out in full where it is defined and by name everywhere else.
    pub fn to_json(&self) -> JsonValue {
        self.node_to_json(self.root, None, false)
    }

    fn node_to_json(
        &self,
        id: NodeId,
        enclosing_namespace: NamespaceRef,
        fullnames: bool,
    ) -> JsonValue {
        match self.node(id) {
            SchemaNode::Null => "null".into(),
            SchemaNode::Boolean => "boolean".into(),
            SchemaNode::Int => "int".into(),
            SchemaNode::Long => "long".into(),
            SchemaNode::Float => "float".into(),
            SchemaNode::Double => "double".into(),
            SchemaNode::Bytes => "bytes".into(),
            SchemaNode::String => "string".into(),
            SchemaNode::Array(ArraySchema { items, attributes }) => {
                let mut map = Map::new();
                map.insert("type".into(), "array".into());
                map.insert(
                    "items".into(),
                    self.node_to_json(*items, enclosing_namespace, fullnames),
                );
                extend_attributes(&mut map, attributes);
                JsonValue::Object(map)
            }
            SchemaNode::Map(MapSchema { values, attributes }) => {
                let mut map = Map::new();
                map.insert("type".into(), "map".into());
                map.insert(
                    "values".into(),
                    self.node_to_json(*values, enclosing_namespace, fullnames),
                );
                extend_attributes(&mut map, attributes);
                JsonValue::Object(map)
            }
            SchemaNode::Union(union) => JsonValue::Array(
                union
                    .variants()
                    .iter()
                    .map(|v| self.node_to_json(*v, enclosing_namespace, fullnames))
                    .collect(),
            ),
            SchemaNode::Record(RecordSchema {
                name,
                aliases,
                doc,
                fields,
                attributes,
                ..
            }) => {
                let mut map = named_to_json("record", name, enclosing_namespace, fullnames);
                insert_doc_and_aliases(&mut map, doc, aliases);
                let fields = fields
                    .iter()
                    .map(|field| self.field_to_json(field, name.namespace(), fullnames))
                    .collect();
                map.insert("fields".into(), JsonValue::Array(fields));
                extend_attributes(&mut map, attributes);
                JsonValue::Object(map)
            }
            SchemaNode::Enum(EnumSchema {
                name,
                aliases,
                doc,
                symbols,
                default,
                attributes,
            }) => {
                let mut map = named_to_json("enum", name, enclosing_namespace, fullnames);
                insert_doc_and_aliases(&mut map, doc, aliases);
                map.insert("symbols".into(), symbols.clone().into());
                if let Some(default) = default {
                    map.insert("default".into(), default.clone().into());
                }
                extend_attributes(&mut map, attributes);
                JsonValue::Object(map)
            }
            SchemaNode::Fixed(FixedSchema {
                name,
                aliases,
                doc,
                size,
                attributes,
            }) => {
                let mut map = named_to_json("fixed", name, enclosing_namespace, fullnames);
                insert_doc_and_aliases(&mut map, doc, aliases);
                map.insert("size".into(), (*size).into());
                extend_attributes(&mut map, attributes);
                JsonValue::Object(map)
            }
            SchemaNode::Ref(RefSchema { name, .. }) => {
                JsonValue::String(reference_name(name, enclosing_namespace, fullnames))
            }
            SchemaNode::Logical(LogicalSchema {
                logical_type,
                inner,
            }) => {
                let mut map = match self.node_to_json(*inner, enclosing_namespace, fullnames) {
                    JsonValue::Object(map) => map,
                    other => {
                        let mut map = Map::new();
                        map.insert("type".into(), other);
                        map
                    }
                };
                map.insert("logicalType".into(), logical_type.name().into());
                if let LogicalType::Decimal { precision, scale } = logical_type {
                    map.insert("precision".into(), (*precision).into());
                    map.insert("scale".into(), (*scale).into());
                }
                JsonValue::Object(map)
            }
        }
    }

    fn field_to_json(
        &self,
        field: &RecordField,
        enclosing_namespace: NamespaceRef,
        fullnames: bool,
    ) -> JsonValue {
        let mut map = Map::new();
        map.insert("name".into(), field.name.clone().into());
        map.insert(
            "type".into(),
            self.node_to_json(field.schema, enclosing_namespace, fullnames),
        );
        if let Some(doc) = &field.doc {
            map.insert("doc".into(), doc.clone().into());
        }
        if let Some(default) = &field.default {
            map.insert("default".into(), default.clone());
        }
        if field.order != RecordFieldOrder::Ascending {
            map.insert("order".into(), field.order.as_ref().into());
        }
        if !field.aliases.is_empty() {
            map.insert("aliases".into(), field.aliases.clone().into());
        }
        extend_attributes(&mut map, &field.custom_attributes);
        JsonValue::Object(map)
    }
}

fn named_to_json(
    typ: &str,
    name: &Name,
    enclosing_namespace: NamespaceRef,
    fullnames: bool,
) -> Map<String, JsonValue> {
    let mut map = Map::new();
    map.insert("type".into(), typ.into());
    if fullnames {
        map.insert("name".into(), name.fullname().into());
    } else {
        if name.namespace() != enclosing_namespace {
            // An empty namespace stops the enclosing one from being inherited
            map.insert("namespace".into(), name.namespace().unwrap_or_default().into());
        }
        map.insert("name".into(), name.name().into());
    }
    map
}

fn reference_name(name: &Name, enclosing_namespace: NamespaceRef, fullnames: bool) -> String {
    if fullnames {
        name.fullname().to_string()
    } else if name.namespace() == enclosing_namespace {
        name.name().to_string()
    } else if name.namespace().is_none() {
        // Leading dot: no namespace, even inside a namespaced record
        format!(".{}", name.name())
    } else {
        name.fullname().to_string()
    }
}

fn insert_doc_and_aliases(map: &mut Map<String, JsonValue>, doc: &Documentation, aliases: &Aliases) {
    if let Some(doc) = doc {
        map.insert("doc".into(), doc.clone().into());
    }
    if let Some(aliases) = aliases {
        map.insert(
            "aliases".into(),
            aliases
                .iter()
                .map(|alias| JsonValue::String(alias.fullname().to_string()))
                .collect(),
        );
    }
}

fn extend_attributes(map: &mut Map<String, JsonValue>, attributes: &BTreeMap<String, JsonValue>) {
    for (key, value) in attributes {
        map.insert(key.clone(), value.clone());
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl PartialEq for Schema {
    /// Assess equality of two `Schema` based on their structure: names, fields, symbols, sizes
    /// and member types. The layout of the node arena does not matter.
    fn eq(&self, other: &Self) -> bool {
        schema_equality::compare_schemata(self, other)
    }
}

impl FromStr for Schema {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

/// Parses a valid Avro schema into [the Parsing Canonical Form].
///
/// [the Parsing Canonical Form](https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas)
fn parsing_canonical_form(schema: &JsonValue, defined_names: &mut HashSet<String>) -> String {
    match schema {
        JsonValue::Object(map) => pcf_map(map, defined_names),
        JsonValue::String(s) => pcf_string(s),
        JsonValue::Array(v) => pcf_array(v, defined_names),
        json => json.to_string(),
    }
}

fn pcf_map(schema: &Map<String, JsonValue>, defined_names: &mut HashSet<String>) -> String {
    let typ = schema.get("type").and_then(|v| v.as_str());
    let name = if is_named_type(typ) {
        let ns = schema.get("namespace").and_then(|v| v.as_str());
        let raw_name = schema.get("name").and_then(|v| v.as_str());
        Some(format!(
            "{}{}",
            ns.map_or("".to_string(), |n| { format!("{n}.") }),
            raw_name.unwrap_or_default()
        ))
    } else {
        None
    };

    //if this is already a defined type, early return
    if let Some(ref n) = name {
        if defined_names.contains(n) {
            return pcf_string(n);
        } else {
            defined_names.insert(n.clone());
        }
    }

    let mut fields = Vec::new();
    for (k, v) in schema {
        // Reduce primitive types to their simple form. ([PRIMITIVE] rule)
        if schema.len() == 1
            && k == "type"
            && let JsonValue::String(s) = v
        {
            return pcf_string(s);
        }

        // Strip out unused fields ([STRIP] rule)
        let Some(position) = field_ordering_position(k) else {
            continue;
        };

        // Fully qualify the name, if it isn't already ([FULLNAMES] rule).
        if k == "name"
            && let Some(ref n) = name
        {
            fields.push((position, format!("{}:{}", pcf_string(k), pcf_string(n))));
            continue;
        }

        // Strip off quotes surrounding "size" type, if they exist ([INTEGERS] rule).
        if k == "size" {
            let size = match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            fields.push((position, format!("{}:{}", pcf_string(k), size)));
            continue;
        }

        // For anything else, recursively process the result.
        fields.push((
            position,
            format!(
                "{}:{}",
                pcf_string(k),
                parsing_canonical_form(v, defined_names)
            ),
        ));
    }

    // Sort the fields by their canonical ordering ([ORDER] rule).
    fields.sort_unstable_by_key(|(position, _)| *position);
    let inter = fields
        .into_iter()
        .map(|(_, v)| v)
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{inter}}}")
}

fn is_named_type(typ: Option<&str>) -> bool {
    matches!(typ, Some("record") | Some("enum") | Some("fixed"))
}

fn pcf_array(arr: &[JsonValue], defined_names: &mut HashSet<String>) -> String {
    let inter = arr
        .iter()
        .map(|a| parsing_canonical_form(a, defined_names))
        .collect::<Vec<String>>()
        .join(",");
    format!("[{inter}]")
}

fn pcf_string(s: &str) -> String {
    format!(r#""{s}""#)
}

const RESERVED_FIELDS: &[&str] = &[
    "name", "type", "fields", "symbols", "items", "values", "size",
];

// Used to define the ordering and inclusion of fields.
fn field_ordering_position(field: &str) -> Option<usize> {
    RESERVED_FIELDS
        .iter()
        .position(|&f| f == field)
        .map(|pos| pos + 1)
}
