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

use avro_datum::{
    ErrorKind, Schema,
    schema::{CodecOptions, LogicalType, SchemaKind},
    types::Value,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sha2::Sha256;

type TestResult = anyhow::Result<()>;

#[rstest]
#[case::null(r#""null""#, SchemaKind::Null)]
#[case::object_primitive(r#"{"type": "string"}"#, SchemaKind::String)]
#[case::nested_containers(
    r#"{"type": "array", "items": {"type": "map", "values": "bytes"}}"#,
    SchemaKind::Array
)]
#[case::union_of_containers(
    r#"["null", {"type": "array", "items": "int"}, {"type": "map", "values": "int"}]"#,
    SchemaKind::Union
)]
#[case::fixed(r#"{"type": "fixed", "name": "md5", "namespace": "org.example", "size": 16}"#, SchemaKind::Fixed)]
#[case::enum_default(
    r#"{"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS"], "default": "SPADES"}"#,
    SchemaKind::Enum
)]
#[case::unknown_logical_type(r#"{"type": "long", "logicalType": "unknown-thing"}"#, SchemaKind::Long)]
#[case::decimal_fixed(
    r#"{"type": "fixed", "name": "Money", "size": 8, "logicalType": "decimal", "precision": 18, "scale": 2}"#,
    SchemaKind::Fixed
)]
#[case::huge_decimal_fixed(
    r#"{"type": "fixed", "name": "Huge", "size": 4611686018427387904, "logicalType": "decimal", "precision": 4}"#,
    SchemaKind::Fixed
)]
#[case::record(
    r#"{
        "type": "record",
        "name": "a.b.Outer",
        "fields": [
            {"name": "inner", "type": {"type": "record", "name": "Inner", "fields": []}},
            {"name": "again", "type": "a.b.Inner"}
        ]
    }"#,
    SchemaKind::Record
)]
fn test_valid_schemata(#[case] raw: &str, #[case] kind: SchemaKind) -> TestResult {
    let schema = Schema::parse_str(raw)?;
    assert_eq!(schema.kind(), kind);

    let reparsed = Schema::parse_str(&serde_json::to_string(&schema)?)?;
    assert_eq!(schema, reparsed);
    assert_eq!(
        schema.fingerprint::<Sha256>().bytes,
        reparsed.fingerprint::<Sha256>().bytes
    );
    Ok(())
}

#[test]
fn test_decimal_on_huge_fixed_keeps_logical_type() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "fixed", "name": "Huge", "size": 4611686018427387904, "logicalType": "decimal", "precision": 4}"#,
    )?;
    assert!(matches!(
        schema.logical_type(schema.root_id()),
        Some(LogicalType::Decimal {
            precision: 4,
            scale: 0
        })
    ));
    Ok(())
}

#[rstest]
#[case::unknown_type(r#""nothing""#)]
#[case::bool_typo(r#"{"type": "array", "items": "bool"}"#)]
#[case::missing_items(r#"{"type": "array"}"#)]
#[case::missing_type(r#"{}"#)]
#[case::empty_union("[]")]
#[case::duplicate_union_member(r#"["null", "null"]"#)]
#[case::nested_union(r#"["int", ["null", "string"]]"#)]
#[case::duplicate_symbol(r#"{"type": "enum", "name": "E", "symbols": ["A", "A"]}"#)]
#[case::negative_size(r#"{"type": "fixed", "name": "F", "size": -1}"#)]
#[case::undefined_name(r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "Missing"}]}"#)]
#[case::invalid_name(r#"{"type": "record", "name": "1R", "fields": []}"#)]
#[case::not_json(r#"{"type": "#)]
fn test_invalid_schemata(#[case] raw: &str) {
    let err = Schema::parse_str(raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema, "{err:?}");
}

#[test]
fn test_permissive_schema_equals_strict_one() -> TestResult {
    let raw = r#"{"type": "map", "values": "string"}"#;
    let strict = Schema::parse_str(raw)?;
    let permissive =
        Schema::parse_str_with_options(raw, CodecOptions::builder().permissive(true).build())?;

    assert!(!strict.is_permissive());
    assert!(permissive.is_permissive());
    assert_eq!(strict, permissive);

    let value = Value::map([("n", Value::Double(1.5))]);
    assert!(!strict.can_encode(&value));
    assert!(permissive.can_encode(&value));
    assert_eq!(permissive.json_encode(&value)?, r#"{"n":"1.5"}"#);
    Ok(())
}

#[test]
fn test_schema_from_str() -> TestResult {
    let schema: Schema = r#"{"type": "array", "items": "long"}"#.parse()?;
    assert_eq!(schema.canonical_form(), r#"{"type":"array","items":"long"}"#);
    Ok(())
}
