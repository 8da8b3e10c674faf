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

//! # Checking values against a schema
//!
//! Whether a [`Value`] can be encoded with a schema node is decided by a single table of rules,
//! one per pair of value kind and schema kind. Each rule says how good the fit is, see [`Fit`],
//! and may look at the value itself, e.g. to check that a `long` is within the range of an
//! `int`.
//!
//! The same table is consulted by [`can_encode`], by the binary and the JSON encoders, and to
//! pick the member of a union a bare value is encoded with.
//!
//! Rules of the [`Fit::Coerced`] tier only apply to permissive schemas, see
//! [`CodecOptions`](crate::schema::CodecOptions).
//!
//! ```
//! use avro_datum::{Schema, types::Value};
//!
//! let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#)?;
//! assert!(schema.can_encode(&Value::Array(vec![Value::Int(1), Value::Long(2)])));
//!
//! let err = schema.validate(&Value::Array(vec![Value::Long(i64::MAX)])).unwrap_err();
//! assert!(err.to_string().contains("$[0]"));
//! # Ok::<(), avro_datum::Error>(())
//! ```

use crate::{
    AvroResult, Error,
    error::Details,
    schema::{EnumSchema, FixedSchema, NodeId, RecordField, Schema, SchemaKind, SchemaNode, UnionSchema},
    types::{Value, ValueKind},
};
use log::{debug, error};
use std::{borrow::Cow, fmt};

/// How well a value fits a schema node, from best to worst.
///
/// A bare value given for a union is encoded with the member it fits best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fit {
    /// The value has the representation the schema asks for.
    Exact,
    /// The value is a number of the same family with another width, e.g. an `Int` for `long`.
    Resized,
    /// An integer for a `double`.
    Promoted,
    /// A lossy or structural conversion, e.g. a `Double` for `float` or a `Map` for a `record`.
    Converted,
    /// A scalar to scalar coercion only permissive schemas accept.
    Coerced,
}

type Accepts = fn(&SchemaNode, &Value) -> Result<(), String>;

struct Rule {
    value: ValueKind,
    schema: SchemaKind,
    fit: Fit,
    accepts: Accepts,
}

const fn rule(value: ValueKind, schema: SchemaKind, fit: Fit, accepts: Accepts) -> Rule {
    Rule {
        value,
        schema,
        fit,
        accepts,
    }
}

#[rustfmt::skip]
static RULES: &[Rule] = &[
    rule(ValueKind::Null,    SchemaKind::Null,    Fit::Exact, always),
    rule(ValueKind::Boolean, SchemaKind::Boolean, Fit::Exact, always),
    rule(ValueKind::Int,     SchemaKind::Int,     Fit::Exact, always),
    rule(ValueKind::Long,    SchemaKind::Long,    Fit::Exact, always),
    rule(ValueKind::Float,   SchemaKind::Float,   Fit::Exact, always),
    rule(ValueKind::Double,  SchemaKind::Double,  Fit::Exact, always),
    rule(ValueKind::Bytes,   SchemaKind::Bytes,   Fit::Exact, always),
    rule(ValueKind::String,  SchemaKind::String,  Fit::Exact, always),
    rule(ValueKind::Fixed,   SchemaKind::Fixed,   Fit::Exact, fixed_size),
    rule(ValueKind::Enum,    SchemaKind::Enum,    Fit::Exact, enum_symbol),
    rule(ValueKind::Array,   SchemaKind::Array,   Fit::Exact, always),
    rule(ValueKind::Map,     SchemaKind::Map,     Fit::Exact, always),
    rule(ValueKind::Record,  SchemaKind::Record,  Fit::Exact, always),

    rule(ValueKind::Int,     SchemaKind::Long,    Fit::Resized, always),
    rule(ValueKind::Long,    SchemaKind::Int,     Fit::Resized, int_range),
    rule(ValueKind::Float,   SchemaKind::Double,  Fit::Resized, always),

    rule(ValueKind::Int,     SchemaKind::Double,  Fit::Promoted, always),
    rule(ValueKind::Long,    SchemaKind::Double,  Fit::Promoted, always),

    rule(ValueKind::Int,     SchemaKind::Float,   Fit::Converted, always),
    rule(ValueKind::Long,    SchemaKind::Float,   Fit::Converted, always),
    rule(ValueKind::Double,  SchemaKind::Float,   Fit::Converted, float_range),
    rule(ValueKind::Fixed,   SchemaKind::Bytes,   Fit::Converted, always),
    rule(ValueKind::Bytes,   SchemaKind::Fixed,   Fit::Converted, fixed_size),
    rule(ValueKind::String,  SchemaKind::Enum,    Fit::Converted, enum_symbol),
    rule(ValueKind::Map,     SchemaKind::Record,  Fit::Converted, always),

    rule(ValueKind::Int,     SchemaKind::String,  Fit::Coerced, always),
    rule(ValueKind::Long,    SchemaKind::String,  Fit::Coerced, always),
    rule(ValueKind::Float,   SchemaKind::String,  Fit::Coerced, always),
    rule(ValueKind::Double,  SchemaKind::String,  Fit::Coerced, always),
    rule(ValueKind::String,  SchemaKind::Int,     Fit::Coerced, int_range),
    rule(ValueKind::String,  SchemaKind::Long,    Fit::Coerced, long_range),
    rule(ValueKind::String,  SchemaKind::Float,   Fit::Coerced, float_range),
    rule(ValueKind::String,  SchemaKind::Double,  Fit::Coerced, double_text),
    rule(ValueKind::Float,   SchemaKind::Int,     Fit::Coerced, int_range),
    rule(ValueKind::Double,  SchemaKind::Int,     Fit::Coerced, int_range),
    rule(ValueKind::Float,   SchemaKind::Long,    Fit::Coerced, long_range),
    rule(ValueKind::Double,  SchemaKind::Long,    Fit::Coerced, long_range),
];

fn always(_: &SchemaNode, _: &Value) -> Result<(), String> {
    Ok(())
}

fn int_range(_: &SchemaNode, value: &Value) -> Result<(), String> {
    as_i32(value)
        .map(|_| ())
        .ok_or_else(|| "not an integer within the range of an int".to_string())
}

fn long_range(_: &SchemaNode, value: &Value) -> Result<(), String> {
    as_i64(value)
        .map(|_| ())
        .ok_or_else(|| "not an integer within the range of a long".to_string())
}

fn float_range(_: &SchemaNode, value: &Value) -> Result<(), String> {
    as_f32(value)
        .map(|_| ())
        .ok_or_else(|| "not a number within the range of a float".to_string())
}

fn double_text(_: &SchemaNode, value: &Value) -> Result<(), String> {
    as_f64(value)
        .map(|_| ())
        .ok_or_else(|| "not a number".to_string())
}

fn fixed_size(node: &SchemaNode, value: &Value) -> Result<(), String> {
    let SchemaNode::Fixed(FixedSchema { size, .. }) = node else {
        return Err("not a fixed schema".to_string());
    };
    match as_bytes(value) {
        Some(bytes) if bytes.len() == *size => Ok(()),
        Some(bytes) => Err(format!(
            "fixed of size {size} needs {size} bytes, got {}",
            bytes.len()
        )),
        None => Err("not a sequence of bytes".to_string()),
    }
}

fn enum_symbol(node: &SchemaNode, value: &Value) -> Result<(), String> {
    let SchemaNode::Enum(enum_schema) = node else {
        return Err("not an enum schema".to_string());
    };
    enum_index(enum_schema, value).map(|_| ()).ok_or_else(|| {
        format!(
            "not one of the symbols {:?}",
            enum_schema.symbols.as_slice()
        )
    })
}

/// The integral value of `x`, if it has one that a `long` can hold.
fn integral(x: f64) -> Option<i64> {
    // 2^63 is exactly representable, i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (x.is_finite() && x.fract() == 0.0 && (-LIMIT..LIMIT).contains(&x)).then_some(x as i64)
}

/// The value as an `int`, converting where a rule allows it.
pub(crate) fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Int(i) => Some(*i),
        other => as_i64(other).and_then(|l| i32::try_from(l).ok()),
    }
}

/// The value as a `long`, converting where a rule allows it.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(i64::from(*i)),
        Value::Long(l) => Some(*l),
        Value::Float(f) => integral(f64::from(*f)),
        Value::Double(d) => integral(*d),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// The value as a `float`. Finite doubles out of the range of a float are rejected.
pub(crate) fn as_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f32),
        Value::Long(l) => Some(*l as f32),
        Value::Double(d) => {
            let f = *d as f32;
            (f.is_finite() || !d.is_finite()).then_some(f)
        }
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// The value as a `double`.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Double(d) => Some(*d),
        Value::Float(f) => Some(f64::from(*f)),
        Value::Int(i) => Some(f64::from(*i)),
        Value::Long(l) => Some(*l as f64),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// The value as a `string`. Numbers are rendered in their canonical text form.
pub(crate) fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Int(i) => Some(Cow::Owned(i.to_string())),
        Value::Long(l) => Some(Cow::Owned(l.to_string())),
        Value::Float(f) => Some(Cow::Owned(format!("{f:?}"))),
        Value::Double(d) => Some(Cow::Owned(format!("{d:?}"))),
        _ => None,
    }
}

/// The value as `bytes` or `fixed`.
pub(crate) fn as_bytes(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Bytes(bytes) | Value::Fixed(_, bytes) => Some(bytes),
        _ => None,
    }
}

/// Position of the symbol named by an `Enum` or `String` value.
pub(crate) fn enum_index(enum_schema: &EnumSchema, value: &Value) -> Option<usize> {
    match value {
        Value::Enum(_, symbol) | Value::String(symbol) => enum_schema.index_of(symbol),
        _ => None,
    }
}

/// A step from a value into one of its parts.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Segment {
    Field(String),
    Index(usize),
    Key(String),
}

/// Renders a location inside a datum the way JSONPath does, e.g. `$.items[2]["key"]`.
///
/// Segments are stored innermost first, as they are collected while unwinding.
pub(crate) struct Path<'a>(pub(crate) &'a [Segment]);

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in self.0.iter().rev() {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
enum Reason {
    Schema {
        value: Value,
        schema: SchemaKind,
        reason: String,
    },
    MapKey(ValueKind),
    AmbiguousUnion {
        value: Value,
        branches: Vec<usize>,
    },
    /// A failure that does not depend on where it happened.
    Other(Error),
}

/// The first part of a value that cannot be encoded, with its location.
#[derive(Debug)]
pub(crate) struct Mismatch {
    path: Vec<Segment>,
    reason: Reason,
}

impl Mismatch {
    pub(crate) fn new(value: &Value, schema: SchemaKind, reason: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            reason: Reason::Schema {
                value: value.clone(),
                schema,
                reason: reason.into(),
            },
        }
    }

    fn map_key(kind: ValueKind) -> Self {
        Self {
            path: Vec::new(),
            reason: Reason::MapKey(kind),
        }
    }

    /// Prefix the location with the step that led to it.
    pub(crate) fn at(mut self, segment: Segment) -> Self {
        self.path.push(segment);
        self
    }

    pub(crate) fn field(field: &RecordField) -> impl FnOnce(Self) -> Self + '_ {
        move |mismatch| mismatch.at(Segment::Field(field.name.clone()))
    }
}

impl From<Error> for Mismatch {
    fn from(error: Error) -> Self {
        Self {
            path: Vec::new(),
            reason: Reason::Other(error),
        }
    }
}

impl From<Mismatch> for Error {
    fn from(mismatch: Mismatch) -> Self {
        let path = Path(&mismatch.path).to_string();
        match mismatch.reason {
            Reason::Schema {
                value,
                schema,
                reason,
            } => Details::ValidationWithReason {
                path,
                value,
                schema,
                reason,
            },
            Reason::MapKey(kind) => Details::MapKeyType { path, kind },
            Reason::AmbiguousUnion { value, branches } => Details::AmbiguousUnion {
                path,
                value,
                branches,
            },
            Reason::Other(error) => return error,
        }
        .into()
    }
}

/// Whether `value` can be encoded with the node `node` of `schema`.
pub fn can_encode(schema: &Schema, node: NodeId, value: &Value) -> bool {
    check(schema, node, value).is_ok()
}

/// Like [`can_encode`], reporting the first part of `value` that does not fit.
pub fn validate(schema: &Schema, node: NodeId, value: &Value) -> AvroResult<()> {
    check(schema, node, value).map(|_| ()).map_err(Error::from)
}

/// Applies the rule of `value` and the non-union node `node`, without looking into containers.
pub(crate) fn scalar_fit(schema: &Schema, node: &SchemaNode, value: &Value) -> Result<Fit, Mismatch> {
    let schema_kind = SchemaKind::from(node);
    let value_kind = value.kind();
    let Some(rule) = RULES
        .iter()
        .find(|rule| rule.value == value_kind && rule.schema == schema_kind)
    else {
        return Err(Mismatch::new(
            value,
            schema_kind,
            format!("a {value_kind:?} value cannot be encoded as {schema_kind}"),
        ));
    };
    if rule.fit == Fit::Coerced && !schema.is_permissive() {
        return Err(Mismatch::new(
            value,
            schema_kind,
            format!("a {value_kind:?} value is only accepted as {schema_kind} by a permissive schema"),
        ));
    }
    (rule.accepts)(node, value).map_err(|reason| Mismatch::new(value, schema_kind, reason))?;
    Ok(rule.fit)
}

/// Rejects any map key that is not a string.
pub(crate) fn check_map_keys(entries: &[(Value, Value)]) -> Result<(), Mismatch> {
    match entries.iter().find(|(key, _)| !matches!(key, Value::String(_))) {
        Some((key, _)) => Err(Mismatch::map_key(key.kind())),
        None => Ok(()),
    }
}

/// The value of `field` in a record or a string keyed map, looked up by name and then by alias.
pub(crate) fn field_value<'a>(field: &RecordField, value: &'a Value) -> Option<&'a Value> {
    value
        .get(&field.name)
        .or_else(|| field.aliases.iter().find_map(|alias| value.get(alias)))
}

/// How well `value` fits `node`: the worst fit of the value and all of its parts.
pub(crate) fn check(schema: &Schema, node: NodeId, value: &Value) -> Result<Fit, Mismatch> {
    let node = schema.node(schema.underlying(node));
    match (node, value) {
        (SchemaNode::Union(union), Value::Union(index, inner)) => {
            let branch = union_branch(union, *index, value)?;
            check(schema, branch, inner)
        }
        (SchemaNode::Union(union), _) => union
            .variants()
            .iter()
            .filter_map(|variant| check(schema, *variant, value).ok())
            .min()
            .ok_or_else(|| no_branch(value)),
        (_, Value::Union(..)) => Err(Mismatch::new(
            value,
            SchemaKind::from(node),
            "a union value needs a union schema",
        )),
        _ => {
            let fit = scalar_fit(schema, node, value)?;
            match (node, value) {
                (SchemaNode::Array(array), Value::Array(items)) => {
                    items.iter().enumerate().try_fold(fit, |fit, (i, item)| {
                        let item_fit = check(schema, array.items, item)
                            .map_err(|m| m.at(Segment::Index(i)))?;
                        Ok(fit.max(item_fit))
                    })
                }
                (SchemaNode::Map(map), Value::Map(entries)) => {
                    check_map_keys(entries)?;
                    entries.iter().try_fold(fit, |fit, (key, item)| {
                        let item_fit = check(schema, map.values, item)
                            .map_err(|m| m.at(Segment::Key(key_text(key))))?;
                        Ok(fit.max(item_fit))
                    })
                }
                (SchemaNode::Record(record), Value::Record(_) | Value::Map(_)) => {
                    if let Value::Map(entries) = value {
                        check_map_keys(entries)?;
                    }
                    record.fields.iter().try_fold(fit, |fit, field| {
                        match field_value(field, value) {
                            Some(item) => {
                                let item_fit = check(schema, field.schema, item)
                                    .map_err(Mismatch::field(field))?;
                                Ok(fit.max(item_fit))
                            }
                            None if field.default_value().is_some() => Ok(fit),
                            None => Err(Mismatch::new(
                                value,
                                SchemaKind::Record,
                                format!("missing field '{}' without a default", field.name),
                            )),
                        }
                    })
                }
                _ => Ok(fit),
            }
        }
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => format!("{other:?}"),
    }
}

fn no_branch(value: &Value) -> Mismatch {
    Mismatch::new(value, SchemaKind::Union, "no member of the union accepts the value")
}

/// The member selected by an explicit [`Value::Union`].
pub(crate) fn union_branch(union: &UnionSchema, index: u32, value: &Value) -> Result<NodeId, Mismatch> {
    usize::try_from(index)
        .ok()
        .and_then(|i| union.variants().get(i))
        .copied()
        .ok_or_else(|| {
            Mismatch::new(
                value,
                SchemaKind::Union,
                format!(
                    "index {index} is out of bounds for a union of {} members",
                    union.variants().len()
                ),
            )
        })
}

/// The members of `union` that `value` fits best, with that fit.
fn best_branches(schema: &Schema, union: &UnionSchema, value: &Value) -> (Option<Fit>, Vec<usize>) {
    let mut best: Option<Fit> = None;
    let mut tied = Vec::new();
    for (i, variant) in union.variants().iter().enumerate() {
        let Ok(fit) = check(schema, *variant, value) else {
            continue;
        };
        match best {
            Some(best_fit) if fit > best_fit => {}
            Some(best_fit) if fit == best_fit => tied.push(i),
            _ => {
                best = Some(fit);
                tied.clear();
                tied.push(i);
            }
        }
    }
    (best, tied)
}

/// The first of `tied` if all of them share one branch name.
fn unambiguous(schema: &Schema, union: &UnionSchema, tied: &[usize]) -> Option<usize> {
    let (first, rest) = tied.split_first()?;
    let name = schema.type_name(union.variants()[*first]);
    rest.iter()
        .all(|i| schema.type_name(union.variants()[*i]) == name)
        .then_some(*first)
}

/// Picks the member of `union` a bare value is encoded with: the one with the best [`Fit`].
///
/// Several members with the best fit are ambiguous unless they all share one branch name, which
/// only happens for `array` and `map` members. The first of those is used.
pub(crate) fn select_branch(schema: &Schema, union: &UnionSchema, value: &Value) -> Result<usize, Mismatch> {
    let (best, tied) = best_branches(schema, union, value);
    if tied.is_empty() {
        return Err(no_branch(value));
    }
    match unambiguous(schema, union, &tied) {
        Some(first) => {
            debug!("Selected union branch {first} with fit {best:?}");
            Ok(first)
        }
        None => {
            error!("Value {value:?} matches union branches {tied:?} equally well");
            Err(Mismatch {
                path: Vec::new(),
                reason: Reason::AmbiguousUnion {
                    value: value.clone(),
                    branches: tied,
                },
            })
        }
    }
}

/// The value decoded from member `index` of `union`.
///
/// It is the bare value when encoding it selects that same member again, and a
/// [`Value::Union`] naming the member otherwise.
pub(crate) fn decoded_union(schema: &Schema, union: &UnionSchema, index: usize, value: Value) -> Value {
    let (_, tied) = best_branches(schema, union, &value);
    if unambiguous(schema, union, &tied) == Some(index) {
        value
    } else {
        Value::Union(index as u32, Box::new(value))
    }
}
