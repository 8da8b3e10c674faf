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

use crate::{
    AvroResult,
    error::Details,
    schema::{NodeId, Schema, SchemaKind, SchemaNode},
    types::Value,
    util::{zig_i32, zig_i64},
    validator::{self, Mismatch, Segment},
};
use log::error;
use std::io::Write;

/// Encode a `Value` into avro format.
///
/// The value is checked against the schema while it is encoded and nothing is written to
/// `writer` unless the whole value could be encoded. Returns the number of bytes written.
pub fn encode<W: Write>(value: &Value, schema: &Schema, writer: &mut W) -> AvroResult<usize> {
    let buffer = encode_to_vec(value, schema)?;
    writer.write_all(&buffer).map_err(Details::WriteBytes)?;
    Ok(buffer.len())
}

/// Encode a `Value` into avro format, returning the bytes.
pub fn encode_to_vec(value: &Value, schema: &Schema) -> AvroResult<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_internal(value, schema, schema.root_id(), &mut buffer)?;
    Ok(buffer)
}

pub(crate) fn encode_bytes<B: AsRef<[u8]> + ?Sized>(s: &B, buffer: &mut Vec<u8>) -> AvroResult<()> {
    let bytes = s.as_ref();
    encode_long(bytes.len() as i64, buffer)?;
    buffer.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn encode_long(i: i64, buffer: &mut Vec<u8>) -> AvroResult<()> {
    zig_i64(i, buffer).map(|_| ())
}

pub(crate) fn encode_int(i: i32, buffer: &mut Vec<u8>) -> AvroResult<()> {
    zig_i32(i, buffer).map(|_| ())
}

/// The value passed the rule of its node but has no representation for it.
fn unrepresentable(value: &Value, node: &SchemaNode) -> Mismatch {
    Mismatch::new(
        value,
        SchemaKind::from(node),
        "the value has no representation for this schema",
    )
}

fn encode_internal(
    value: &Value,
    schema: &Schema,
    node: NodeId,
    buffer: &mut Vec<u8>,
) -> Result<(), Mismatch> {
    let node = schema.node(schema.underlying(node));

    if let SchemaNode::Union(union) = node {
        let (index, branch, item) = match value {
            Value::Union(index, item) => (
                *index as usize,
                validator::union_branch(union, *index, value)?,
                item.as_ref(),
            ),
            _ => {
                let index = validator::select_branch(schema, union, value)?;
                (index, union.variants()[index], value)
            }
        };
        encode_long(index as i64, buffer)?;
        return encode_internal(item, schema, branch, buffer);
    }

    if let Value::Union(..) = value {
        return Err(Mismatch::new(
            value,
            SchemaKind::from(node),
            "a union value needs a union schema",
        ));
    }

    validator::scalar_fit(schema, node, value).inspect_err(|_| {
        if let SchemaNode::Enum(enum_schema) = node {
            error!("Invalid symbol {value:?} for enum {}", enum_schema.name);
        }
    })?;

    match (node, value) {
        (SchemaNode::Null, _) => {}
        (SchemaNode::Boolean, Value::Boolean(b)) => buffer.push(u8::from(*b)),
        (SchemaNode::Int, _) => {
            let i = validator::as_i32(value).ok_or_else(|| unrepresentable(value, node))?;
            encode_int(i, buffer)?;
        }
        (SchemaNode::Long, _) => {
            let i = validator::as_i64(value).ok_or_else(|| unrepresentable(value, node))?;
            encode_long(i, buffer)?;
        }
        (SchemaNode::Float, _) => {
            let x = validator::as_f32(value).ok_or_else(|| unrepresentable(value, node))?;
            buffer.extend_from_slice(&x.to_le_bytes());
        }
        (SchemaNode::Double, _) => {
            let x = validator::as_f64(value).ok_or_else(|| unrepresentable(value, node))?;
            buffer.extend_from_slice(&x.to_le_bytes());
        }
        (SchemaNode::Bytes, _) => {
            let bytes = validator::as_bytes(value).ok_or_else(|| unrepresentable(value, node))?;
            encode_bytes(bytes, buffer)?;
        }
        (SchemaNode::String, _) => {
            let s = validator::as_text(value).ok_or_else(|| unrepresentable(value, node))?;
            encode_bytes(s.as_ref(), buffer)?;
        }
        (SchemaNode::Fixed(_), _) => {
            let bytes = validator::as_bytes(value).ok_or_else(|| unrepresentable(value, node))?;
            buffer.extend_from_slice(bytes);
        }
        (SchemaNode::Enum(enum_schema), _) => {
            let index = validator::enum_index(enum_schema, value)
                .and_then(|i| i32::try_from(i).ok())
                .ok_or_else(|| unrepresentable(value, node))?;
            encode_int(index, buffer)?;
        }
        (SchemaNode::Array(array), Value::Array(items)) => {
            if !items.is_empty() {
                encode_long(items.len() as i64, buffer)?;
                for (i, item) in items.iter().enumerate() {
                    encode_internal(item, schema, array.items, buffer)
                        .map_err(|m| m.at(Segment::Index(i)))?;
                }
            }
            buffer.push(0u8);
        }
        (SchemaNode::Map(map), Value::Map(entries)) => {
            validator::check_map_keys(entries)?;
            if !entries.is_empty() {
                encode_long(entries.len() as i64, buffer)?;
                for (key, item) in entries {
                    let Value::String(key) = key else {
                        return Err(unrepresentable(value, node));
                    };
                    encode_bytes(key, buffer)?;
                    encode_internal(item, schema, map.values, buffer)
                        .map_err(|m| m.at(Segment::Key(key.clone())))?;
                }
            }
            buffer.push(0u8);
        }
        (SchemaNode::Record(record), Value::Record(_) | Value::Map(_)) => {
            if let Value::Map(entries) = value {
                validator::check_map_keys(entries)?;
            }
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
                encode_internal(item, schema, field.schema, buffer)
                    .map_err(Mismatch::field(field))?;
            }
        }
        _ => return Err(unrepresentable(value, node)),
    }
    Ok(())
}
