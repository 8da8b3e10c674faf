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

//! # The Avro JSON encoding
//!
//! Values map to JSON the way the [Avro specification] describes it:
//!
//! | Schema                | JSON                                                        |
//! |-----------------------|-------------------------------------------------------------|
//! | `null`                | `null`                                                      |
//! | `boolean`             | `true` or `false`                                           |
//! | `int`, `long`         | integer                                                     |
//! | `float`, `double`     | number                                                      |
//! | `bytes`, `fixed`      | string, one code point between U+0000 and U+00FF per byte   |
//! | `string`              | string                                                      |
//! | `enum`                | the symbol as a string                                      |
//! | `array`, `map`        | array, object                                               |
//! | `record`              | object with one entry per field, in the declared order      |
//! | `union`               | `null`, or an object `{"<branch name>": value}`             |
//!
//! The text is plain ASCII, see [`AsciiFormatter`].
//!
//! [Avro specification]: https://avro.apache.org/docs/++version++/specification/#json-encoding

mod formatter;

pub use formatter::AsciiFormatter;

use crate::{
    AvroResult, Error,
    error::Details,
    schema::{NodeId, Schema, SchemaKind, SchemaNode},
    types::Value,
    validator::{self, Mismatch, Path, Segment},
};
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

/// Encode `value` with `schema` in the Avro JSON format.
pub fn to_json_string(value: &Value, schema: &Schema) -> AvroResult<String> {
    let json = to_json(value, schema, schema.root_id())?;
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    json.serialize(&mut serializer)
        .map_err(Details::ConvertJsonToString)?;
    // the formatter only writes ASCII
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Decode a datum written in the Avro JSON format.
pub fn from_json_str(schema: &Schema, text: &str) -> AvroResult<Value> {
    let json: JsonValue = serde_json::from_str(text).map_err(Details::ParseJson)?;
    JsonDecoder::new(schema, Mode::Datum).decode(schema.root_id(), &json)
}

/// Converts the `default` of a record field to a value of `node`.
///
/// Defaults use the JSON encoding, except that a union default is not wrapped in an object.
/// The first member of the union the default fits is used.
pub(crate) fn default_value(schema: &Schema, node: NodeId, json: &JsonValue) -> AvroResult<Value> {
    JsonDecoder::new(schema, Mode::Default).decode(node, json)
}

fn to_json(value: &Value, schema: &Schema, node: NodeId) -> AvroResult<JsonValue> {
    encode_internal(value, schema, node).map_err(Error::from)
}

fn float_to_json(x: f64) -> Result<JsonValue, Mismatch> {
    Number::from_f64(x)
        .map(JsonValue::Number)
        .ok_or_else(|| Error::from(Details::ConvertF64ToJson(x)).into())
}

fn encode_internal(value: &Value, schema: &Schema, node: NodeId) -> Result<JsonValue, Mismatch> {
    let node = schema.node(schema.underlying(node));

    if let SchemaNode::Union(union) = node {
        let (branch, item) = match value {
            Value::Union(index, item) => (
                validator::union_branch(union, *index, value)?,
                item.as_ref(),
            ),
            _ => {
                let index = validator::select_branch(schema, union, value)?;
                (union.variants()[index], value)
            }
        };
        let encoded = encode_internal(item, schema, branch)?;
        if schema.kind_of(branch) == SchemaKind::Null {
            return Ok(JsonValue::Null);
        }
        let mut wrapper = Map::with_capacity(1);
        wrapper.insert(schema.type_name(branch).into_owned(), encoded);
        return Ok(JsonValue::Object(wrapper));
    }

    if let Value::Union(..) = value {
        return Err(Mismatch::new(
            value,
            SchemaKind::from(node),
            "a union value needs a union schema",
        ));
    }

    validator::scalar_fit(schema, node, value)?;

    let unrepresentable = || {
        Mismatch::new(
            value,
            SchemaKind::from(node),
            "the value has no representation for this schema",
        )
    };

    Ok(match (node, value) {
        (SchemaNode::Null, _) => JsonValue::Null,
        (SchemaNode::Boolean, Value::Boolean(b)) => JsonValue::Bool(*b),
        (SchemaNode::Int, _) => validator::as_i32(value)
            .ok_or_else(unrepresentable)?
            .into(),
        (SchemaNode::Long, _) => validator::as_i64(value)
            .ok_or_else(unrepresentable)?
            .into(),
        (SchemaNode::Float, _) => {
            let x = validator::as_f32(value).ok_or_else(unrepresentable)?;
            // through the shortest text form, so that 0.1f32 stays 0.1
            let widened = x.to_string().parse::<f64>().unwrap_or(f64::from(x));
            float_to_json(widened)?
        }
        (SchemaNode::Double, _) => {
            float_to_json(validator::as_f64(value).ok_or_else(unrepresentable)?)?
        }
        (SchemaNode::Bytes | SchemaNode::Fixed(_), _) => {
            let bytes = validator::as_bytes(value).ok_or_else(unrepresentable)?;
            JsonValue::String(bytes.iter().map(|&b| char::from(b)).collect())
        }
        (SchemaNode::String, _) => {
            JsonValue::String(validator::as_text(value).ok_or_else(unrepresentable)?.into_owned())
        }
        (SchemaNode::Enum(enum_schema), _) => {
            let index = validator::enum_index(enum_schema, value).ok_or_else(unrepresentable)?;
            JsonValue::String(enum_schema.symbols[index].clone())
        }
        (SchemaNode::Array(array), Value::Array(items)) => JsonValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    encode_internal(item, schema, array.items).map_err(|m| m.at(Segment::Index(i)))
                })
                .collect::<Result<_, _>>()?,
        ),
        (SchemaNode::Map(map), Value::Map(entries)) => {
            validator::check_map_keys(entries)?;
            let mut object = Map::with_capacity(entries.len());
            for (key, item) in entries {
                let Value::String(key) = key else {
                    return Err(unrepresentable());
                };
                let encoded = encode_internal(item, schema, map.values)
                    .map_err(|m| m.at(Segment::Key(key.clone())))?;
                object.insert(key.clone(), encoded);
            }
            JsonValue::Object(object)
        }
        (SchemaNode::Record(record), Value::Record(_) | Value::Map(_)) => {
            if let Value::Map(entries) = value {
                validator::check_map_keys(entries)?;
            }
            let mut object = Map::with_capacity(record.fields.len());
            for field in &record.fields {
                let item = validator::field_value(field, value)
                    .or_else(|| field.default_value())
                    .ok_or_else(|| {
                        Mismatch::new(
                            value,
                            SchemaKind::Record,
                            format!("missing field '{}' without a default", field.name),
                        )
                    })?;
                let encoded =
                    encode_internal(item, schema, field.schema).map_err(Mismatch::field(field))?;
                object.insert(field.name.clone(), encoded);
            }
            JsonValue::Object(object)
        }
        _ => return Err(unrepresentable()),
    })
}

/// How unions are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// `null` or `{"<branch name>": value}`.
    Datum,
    /// The bare value of the first member it fits, as in field defaults.
    Default,
}

struct JsonDecoder<'s> {
    schema: &'s Schema,
    mode: Mode,
    /// Outermost first.
    path: Vec<Segment>,
}

impl<'s> JsonDecoder<'s> {
    fn new(schema: &'s Schema, mode: Mode) -> Self {
        Self {
            schema,
            mode,
            path: Vec::new(),
        }
    }

    fn path(&self) -> String {
        let innermost_first: Vec<Segment> = self.path.iter().rev().cloned().collect();
        Path(&innermost_first).to_string()
    }

    fn mismatch(&self, expected: SchemaKind, found: &JsonValue) -> Error {
        Details::JsonTypeMismatch {
            path: self.path(),
            expected,
            found: found.clone(),
        }
        .into()
    }

    fn nested<T>(
        &mut self,
        segment: Segment,
        f: impl FnOnce(&mut Self) -> AvroResult<T>,
    ) -> AvroResult<T> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    fn decode(&mut self, node: NodeId, json: &JsonValue) -> AvroResult<Value> {
        let schema = self.schema;
        let node = schema.node(schema.underlying(node));
        let kind = SchemaKind::from(node);
        match (node, json) {
            (SchemaNode::Null, JsonValue::Null) => Ok(Value::Null),
            (SchemaNode::Boolean, JsonValue::Bool(b)) => Ok(Value::Boolean(*b)),
            (SchemaNode::Int, JsonValue::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int)
                .ok_or_else(|| self.mismatch(kind, json)),
            (SchemaNode::Long, JsonValue::Number(n)) => n
                .as_i64()
                .map(Value::Long)
                .ok_or_else(|| self.mismatch(kind, json)),
            (SchemaNode::Float, JsonValue::Number(n)) => n
                .as_f64()
                .and_then(|x| validator::as_f32(&Value::Double(x)))
                .map(Value::Float)
                .ok_or_else(|| self.mismatch(kind, json)),
            (SchemaNode::Double, JsonValue::Number(n)) => n
                .as_f64()
                .map(Value::Double)
                .ok_or_else(|| self.mismatch(kind, json)),
            (SchemaNode::Bytes, JsonValue::String(s)) => decode_bytes(s).map(Value::Bytes),
            (SchemaNode::String, JsonValue::String(s)) => Ok(Value::String(s.clone())),
            (SchemaNode::Fixed(fixed), JsonValue::String(s)) => {
                let bytes = decode_bytes(s)?;
                if bytes.len() != fixed.size {
                    return Err(Details::CompareFixedSizes {
                        size: fixed.size,
                        n: bytes.len(),
                    }
                    .into());
                }
                Ok(Value::Fixed(fixed.size, bytes))
            }
            (SchemaNode::Enum(enum_schema), JsonValue::String(symbol)) => {
                match enum_schema.index_of(symbol) {
                    Some(index) => Ok(Value::Enum(index as u32, symbol.clone())),
                    None => Err(Details::JsonEnumSymbol {
                        path: self.path(),
                        symbol: symbol.clone(),
                        symbols: enum_schema.symbols.clone(),
                    }
                    .into()),
                }
            }
            (SchemaNode::Array(array), JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.nested(Segment::Index(i), |this| this.decode(array.items, item))
                })
                .collect::<AvroResult<_>>()
                .map(Value::Array),
            (SchemaNode::Map(map), JsonValue::Object(object)) => object
                .iter()
                .map(|(key, item)| {
                    self.nested(Segment::Key(key.clone()), |this| this.decode(map.values, item))
                        .map(|value| (Value::String(key.clone()), value))
                })
                .collect::<AvroResult<_>>()
                .map(Value::Map),
            (SchemaNode::Record(record), JsonValue::Object(object)) => {
                let mut fields = Vec::with_capacity(record.fields.len());
                for field in &record.fields {
                    let found = object.get(&field.name).or_else(|| {
                        field
                            .aliases
                            .iter()
                            .find_map(|alias| object.get(alias))
                    });
                    let value = match (found, field.default_value(), &field.default) {
                        (Some(item), _, _) => self.nested(
                            Segment::Field(field.name.clone()),
                            |this| this.decode(field.schema, item),
                        )?,
                        (None, Some(default), _) => default.clone(),
                        // defaults are being resolved, the raw one is still good
                        (None, None, Some(raw)) => self.nested(
                            Segment::Field(field.name.clone()),
                            |this| default_value(this.schema, field.schema, raw),
                        )?,
                        (None, None, None) => {
                            return Err(Details::JsonMissingField {
                                path: self.path(),
                                field: field.name.clone(),
                            }
                            .into());
                        }
                    };
                    fields.push((field.name.clone(), value));
                }
                Ok(Value::Record(fields))
            }
            (SchemaNode::Union(union), _) if self.mode == Mode::Default => {
                for (index, variant) in union.variants().iter().enumerate() {
                    if let Ok(value) = self.decode(*variant, json) {
                        return Ok(validator::decoded_union(schema, union, index, value));
                    }
                }
                Err(self.mismatch(kind, json))
            }
            (SchemaNode::Union(union), JsonValue::Null) => union
                .find_branch(schema, "null")
                .map(|index| validator::decoded_union(schema, union, index, Value::Null))
                .ok_or_else(|| {
                    Details::JsonUnionBranch {
                        path: self.path(),
                        name: "null".to_string(),
                    }
                    .into()
                }),
            (SchemaNode::Union(union), JsonValue::Object(object)) if object.len() == 1 => {
                let Some((name, item)) = object.iter().next() else {
                    return Err(self.mismatch(kind, json));
                };
                let mut first_error = None;
                // array and map members share a branch name, the first one that fits wins
                for (index, variant) in union.variants().iter().enumerate() {
                    if schema.type_name(*variant) != name.as_str() {
                        continue;
                    }
                    match self.decode(*variant, item) {
                        Ok(value) => return Ok(validator::decoded_union(schema, union, index, value)),
                        Err(e) => {
                            first_error.get_or_insert(e);
                        }
                    }
                }
                Err(first_error.unwrap_or_else(|| {
                    Details::JsonUnionBranch {
                        path: self.path(),
                        name: name.clone(),
                    }
                    .into()
                }))
            }
            _ => Err(self.mismatch(kind, json)),
        }
    }
}

/// Bytes are written as one code point per byte.
fn decode_bytes(s: &str) -> AvroResult<Vec<u8>> {
    s.chars()
        .map(|c| u8::try_from(c).map_err(|_| Details::JsonByteCodePoint(c).into()))
        .collect()
}
