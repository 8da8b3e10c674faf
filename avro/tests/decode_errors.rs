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

use avro_datum::{ErrorKind, Schema, error::Details, types::Value};
use hex_literal::hex;
use pretty_assertions::assert_eq;
use rstest::rstest;

type TestResult = anyhow::Result<()>;

const RECORD: &str = r#"{
    "type": "record",
    "name": "R",
    "fields": [
        {"name": "a", "type": "int"},
        {"name": "b", "type": "string"}
    ]
}"#;

#[rstest]
#[case::truncated_record(RECORD, &hex!("02"), |d: &Details| matches!(d, Details::ReadBytes { .. }))]
#[case::truncated_string(RECORD, &hex!("02 06 6162"), |d: &Details| {
    matches!(d, Details::ReadBytes { needed: 3, remaining: 2 })
})]
#[case::trailing(RECORD, &hex!("02 02 61 00"), |d: &Details| matches!(d, Details::TrailingBytes(1)))]
#[case::empty_input(r#""long""#, b"", |d: &Details| matches!(d, Details::ReadBytes { .. }))]
#[case::bad_union_index(
    r#"["null", "string"]"#,
    &hex!("06"),
    |d: &Details| matches!(d, Details::GetUnionVariant { index: 3, num_variants: 2 })
)]
#[case::bad_enum_index(
    r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#,
    &hex!("03"),
    |d: &Details| matches!(d, Details::GetEnumValue { index: -2, .. })
)]
#[case::negative_length(r#""string""#, &hex!("03"), |d: &Details| matches!(d, Details::NegativeLength(-2)))]
#[case::oversized_length(
    r#""string""#,
    &hex!("feffffffffffffffff01"),
    |d: &Details| matches!(d, Details::MemoryAllocation { .. })
)]
#[case::oversized_block(
    r#"{"type": "array", "items": "null"}"#,
    &hex!("feffffffffffffffff01"),
    |d: &Details| matches!(d, Details::MemoryAllocation { .. })
)]
#[case::oversized_block_of_nulls(
    r#"{"type": "array", "items": "null"}"#,
    // 20,000,000 items taking no input bytes
    &hex!("80b48913 00"),
    |d: &Details| matches!(d, Details::MemoryAllocation { .. })
)]
#[case::oversized_map_of_nulls(
    r#"{"type": "map", "values": "null"}"#,
    &hex!("80b48913 00"),
    |d: &Details| matches!(d, Details::MemoryAllocation { .. })
)]
#[case::missing_block_size(
    r#"{"type": "array", "items": "int"}"#,
    &hex!("01"),
    |d: &Details| matches!(d, Details::ReadBytes { .. })
)]
#[case::missing_end_of_array(
    r#"{"type": "array", "items": "int"}"#,
    &hex!("02 02"),
    |d: &Details| matches!(d, Details::ReadBytes { .. })
)]
#[case::int_overflow(r#""int""#, &hex!("8080808010"), |d: &Details| matches!(d, Details::ZagI32(..)))]
#[case::invalid_utf8(r#""string""#, &hex!("04 c328"), |d: &Details| matches!(d, Details::ConvertToUtf8(_)))]
#[case::short_fixed(
    r#"{"type": "fixed", "name": "F", "size": 4}"#,
    &hex!("010203"),
    |d: &Details| matches!(d, Details::ReadBytes { needed: 4, remaining: 3 })
)]
fn test_decode_errors(
    #[case] raw_schema: &str,
    #[case] input: &[u8],
    #[case] check: fn(&Details) -> bool,
) -> TestResult {
    let schema = Schema::parse_str(raw_schema)?;
    let err = schema.binary_decode(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(check(err.details()), "{err:?}");
    Ok(())
}

#[test]
fn test_negative_block_counts() -> TestResult {
    let schema = Schema::parse_str(r#"{"type": "array", "items": "long"}"#)?;
    // -2 items in 2 bytes, 1 item, end
    let input = hex!("03 04 02 04  02 06  00");
    assert_eq!(
        schema.binary_decode(&input)?,
        Value::Array(vec![Value::Long(1), Value::Long(2), Value::Long(3)])
    );
    Ok(())
}
