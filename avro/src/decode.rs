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
    schema::{NodeId, Schema, SchemaNode},
    types::Value,
    util::{safe_len, take, zag_i32, zag_i64},
    validator,
};

/// Decode a single datum from `bytes`. The datum must use up all of the input.
pub fn decode(schema: &Schema, bytes: &[u8]) -> AvroResult<Value> {
    let mut reader = bytes;
    let value = decode_internal(schema, schema.root_id(), &mut reader)?;
    if !reader.is_empty() {
        return Err(Details::TrailingBytes(reader.len()).into());
    }
    Ok(value)
}

#[inline]
fn decode_len(reader: &mut &[u8]) -> AvroResult<usize> {
    let len = zag_i64(reader)?;
    safe_len(usize::try_from(len).map_err(|_| Details::NegativeLength(len))?)
}

/// Decode the count of the next block of an array or a map.
///
/// A negative count is followed by the size of the block in bytes, which is not needed here.
fn decode_seq_len(reader: &mut &[u8]) -> AvroResult<usize> {
    let raw_len = zag_i64(reader)?;
    let len = usize::try_from(raw_len.unsigned_abs()).map_err(|_| Details::IntegerOverflow)?;
    if raw_len < 0 {
        let _size = zag_i64(reader)?;
    }
    Ok(len)
}

/// Reads the blocks of an array or a map, calling `item` once per element.
///
/// The items of all blocks together, `item_size` bytes each in memory, must stay within the
/// allocation limit, as items may take no input bytes at all.
fn decode_blocks(
    reader: &mut &[u8],
    item_size: usize,
    mut item: impl FnMut(&mut &[u8]) -> AvroResult<()>,
) -> AvroResult<()> {
    let mut total: usize = 0;
    loop {
        let len = decode_seq_len(reader)?;
        if len == 0 {
            return Ok(());
        }
        total = total.saturating_add(len);
        safe_len(total.saturating_mul(item_size))?;
        for _ in 0..len {
            item(reader)?;
        }
    }
}

fn decode_internal(schema: &Schema, node: NodeId, reader: &mut &[u8]) -> AvroResult<Value> {
    match schema.node(node) {
        SchemaNode::Null => Ok(Value::Null),
        SchemaNode::Boolean => match take(reader, 1)? {
            [0u8] => Ok(Value::Boolean(false)),
            [1u8] => Ok(Value::Boolean(true)),
            [other, ..] => Err(Details::BoolValue(*other).into()),
            [] => Err(Details::ReadBytes {
                needed: 1,
                remaining: 0,
            }
            .into()),
        },
        SchemaNode::Int => zag_i32(reader).map(Value::Int),
        SchemaNode::Long => zag_i64(reader).map(Value::Long),
        SchemaNode::Float => {
            let bytes: [u8; 4] = take(reader, 4)?
                .try_into()
                .map_err(|_| Details::ReadBytes { needed: 4, remaining: 0 })?;
            Ok(Value::Float(f32::from_le_bytes(bytes)))
        }
        SchemaNode::Double => {
            let bytes: [u8; 8] = take(reader, 8)?
                .try_into()
                .map_err(|_| Details::ReadBytes { needed: 8, remaining: 0 })?;
            Ok(Value::Double(f64::from_le_bytes(bytes)))
        }
        SchemaNode::Bytes => {
            let len = decode_len(reader)?;
            Ok(Value::Bytes(take(reader, len)?.to_vec()))
        }
        SchemaNode::String => decode_string(reader).map(Value::String),
        SchemaNode::Fixed(fixed) => Ok(Value::Fixed(fixed.size, take(reader, fixed.size)?.to_vec())),
        SchemaNode::Enum(enum_schema) => {
            let raw_index = zag_i64(reader)?;
            let symbol = usize::try_from(raw_index)
                .ok()
                .and_then(|index| enum_schema.symbols.get(index))
                .ok_or(Details::GetEnumValue {
                    index: raw_index,
                    nsymbols: enum_schema.symbols.len(),
                })?;
            Ok(Value::Enum(raw_index as u32, symbol.clone()))
        }
        SchemaNode::Union(union) => {
            let raw_index = zag_i64(reader)?;
            let (index, variant) = u32::try_from(raw_index)
                .ok()
                .and_then(|index| Some((index as usize, *union.variants().get(index as usize)?)))
                .ok_or(Details::GetUnionVariant {
                    index: raw_index,
                    num_variants: union.variants().len(),
                })?;
            let value = decode_internal(schema, variant, reader)?;
            Ok(validator::decoded_union(schema, union, index, value))
        }
        SchemaNode::Array(array) => {
            let mut items = Vec::new();
            decode_blocks(reader, size_of::<Value>(), |reader| {
                items.push(decode_internal(schema, array.items, reader)?);
                Ok(())
            })?;
            Ok(Value::Array(items))
        }
        SchemaNode::Map(map) => {
            let mut entries = Vec::new();
            decode_blocks(reader, size_of::<(Value, Value)>(), |reader| {
                let key = decode_string(reader)?;
                let value = decode_internal(schema, map.values, reader)?;
                entries.push((Value::String(key), value));
                Ok(())
            })?;
            Ok(Value::Map(entries))
        }
        SchemaNode::Record(record) => {
            let mut fields = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let value = decode_internal(schema, field.schema, reader)?;
                fields.push((field.name.clone(), value));
            }
            Ok(Value::Record(fields))
        }
        SchemaNode::Ref(reference) => decode_internal(schema, reference.target, reader),
        SchemaNode::Logical(logical) => decode_internal(schema, logical.inner, reader),
    }
}

fn decode_string(reader: &mut &[u8]) -> AvroResult<String> {
    let len = decode_len(reader)?;
    let bytes = take(reader, len)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| Details::ConvertToUtf8(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TestResult};
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_array_without_size() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#)?;
        let input = hex!("06 02 04 06 00");
        assert_eq!(
            decode(&schema, &input)?,
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        Ok(())
    }

    #[test]
    fn test_decode_array_with_size() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#)?;
        // -3 items, 3 bytes, then a second block of one item
        let input = hex!("05 06 02 04 06 02 08 00");
        assert_eq!(
            decode(&schema, &input)?,
            Value::Array(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
                Value::Int(4)
            ])
        );
        Ok(())
    }

    #[test]
    fn test_decode_map_with_negative_block() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "map", "values": "int"}"#)?;
        let input = hex!("01 06 02 41 02 00");
        assert_eq!(decode(&schema, &input)?, Value::map([("A", 1)]));
        Ok(())
    }

    #[test]
    fn test_decode_record_with_nested_union() -> TestResult {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "R",
                "fields": [
                    {"name": "a", "type": ["null", "long"]},
                    {"name": "e", "type": {"type": "enum", "name": "E", "symbols": ["X", "Y"]}}
                ]
            }"#,
        )?;
        assert_eq!(
            decode(&schema, &hex!("02 04 02"))?,
            Value::record([
                ("a", Value::Long(2)),
                ("e", Value::Enum(1, "Y".into())),
            ])
        );
        Ok(())
    }

    #[test]
    fn test_decode_errors() -> TestResult {
        let cases: &[(&str, &[u8], fn(&Details) -> bool)] = &[
            (r#""boolean""#, &hex!("02"), |d| matches!(d, Details::BoolValue(2))),
            (r#""long""#, &hex!("80"), |d| matches!(d, Details::ReadBytes { .. })),
            (r#""long""#, &hex!("ffffffffffffffffffff01"), |d| {
                matches!(d, Details::IntegerOverflow)
            }),
            (r#""int""#, &hex!("8080808020"), |d| matches!(d, Details::ZagI32(..))),
            (r#""double""#, &hex!("0000"), |d| matches!(d, Details::ReadBytes { .. })),
            (r#""bytes""#, &hex!("01"), |d| matches!(d, Details::NegativeLength(-1))),
            (r#""bytes""#, &hex!("0a 01"), |d| {
                matches!(d, Details::ReadBytes { needed: 5, remaining: 1 })
            }),
            (r#""string""#, &hex!("02 ff"), |d| matches!(d, Details::ConvertToUtf8(_))),
            (r#"["null", "int"]"#, &hex!("04"), |d| {
                matches!(d, Details::GetUnionVariant { index: 2, num_variants: 2 })
            }),
            (r#"["null", "int"]"#, &hex!("01"), |d| {
                matches!(d, Details::GetUnionVariant { index: -1, .. })
            }),
            (r#"{"type": "enum", "name": "E", "symbols": ["A"]}"#, &hex!("02"), |d| {
                matches!(d, Details::GetEnumValue { index: 1, nsymbols: 1 })
            }),
            (r#""int""#, &hex!("02 00"), |d| matches!(d, Details::TrailingBytes(1))),
        ];
        for (raw, input, check) in cases {
            let schema = Schema::parse_str(raw)?;
            let err: Error = decode(&schema, input).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Decode);
            assert!(check(err.details()), "{raw}: {err:?}");
        }
        Ok(())
    }

    #[test]
    fn test_decode_block_of_nulls() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "null"}"#)?;
        assert_eq!(
            decode(&schema, &hex!("14 00"))?,
            Value::Array(vec![Value::Null; 10])
        );

        // -20,000,000 nulls in 0 bytes
        let err = decode(&schema, &hex!("ffb38913 00 00")).unwrap_err();
        assert!(
            matches!(err.details(), Details::MemoryAllocation { .. }),
            "{err:?}"
        );
        Ok(())
    }

    #[test]
    fn test_decode_oversized_length() -> TestResult {
        let schema = Schema::parse_str(r#""bytes""#)?;
        // 2^62 bytes
        let input = hex!("8080808080808080 8001");
        let err = decode(&schema, &input).unwrap_err();
        assert!(
            matches!(err.details(), Details::MemoryAllocation { .. }),
            "{err:?}"
        );
        Ok(())
    }
}
