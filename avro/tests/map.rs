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
    error::Details,
    schema::CodecOptions,
    types::{Value, ValueKind},
};
use hex_literal::hex;
use pretty_assertions::assert_eq;
use rstest::rstest;

type TestResult = anyhow::Result<()>;

const MAP_OF_INTS: &str = r#"{"type": "map", "values": "int"}"#;

#[test]
fn test_map() -> TestResult {
    let schema = Schema::parse_str(MAP_OF_INTS)?;
    assert_eq!(schema.binary_encode(&Value::map::<&str, i32>([]))?, hex!("00"));
    assert_eq!(schema.binary_encode(&Value::map([("", 0)]))?, hex!("02 00 00 00"));
    assert_eq!(
        schema.binary_encode(&Value::map([("A", 1), ("B", 2)]))?,
        hex!("04 02 41 02 02 42 04 00")
    );
    assert_eq!(
        schema.binary_encode(&Value::map([("A", 1), ("B", 2), ("XX", 99999)]))?,
        hex!(
            "06"       // 3 entries
            "02 41"    // "A"
            "02"       // 1
            "02 42"    // "B"
            "04"       // 2
            "04 5858"  // "XX"
            "be9a0c"   // 99999
            "00"       // end of map
        )
    );
    Ok(())
}

#[test]
fn test_map_round_trip_keeps_order() -> TestResult {
    let schema = Schema::parse_str(MAP_OF_INTS)?;
    let value = Value::map([("z", 1), ("a", -1), ("m", 0)]);
    assert_eq!(schema.binary_decode(&schema.binary_encode(&value)?)?, value);
    assert_eq!(schema.json_encode(&value)?, r#"{"z":1,"a":-1,"m":0}"#);
    assert_eq!(schema.json_decode(r#"{"z":1,"a":-1,"m":0}"#)?, value);
    Ok(())
}

#[rstest]
#[case::int_key(Value::Int(1), ValueKind::Int)]
#[case::tuple_key(Value::Array(vec![Value::from("x")]), ValueKind::Array)]
fn test_map_non_string_keys(#[case] key: Value, #[case] kind: ValueKind) -> TestResult {
    for options in [
        CodecOptions::default(),
        CodecOptions::builder().permissive(true).build(),
    ] {
        let schema = Schema::parse_str_with_options(MAP_OF_INTS, options)?;
        let value = Value::Map(vec![(key.clone(), Value::Int(2))]);
        assert!(!schema.can_encode(&value));

        let err = schema.binary_encode(&value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encode);
        match err.into_details() {
            Details::MapKeyType { kind: found, .. } => assert_eq!(found, kind),
            other => panic!("Expected Details::MapKeyType, got {other:?}"),
        }
        assert!(schema.json_encode(&value).is_err());
    }
    Ok(())
}

#[test]
fn test_map_values_are_checked_before_output() -> TestResult {
    let schema = Schema::parse_str(MAP_OF_INTS)?;
    let value = Value::map([("a", Value::Int(1)), ("b", Value::from("two"))]);
    let mut out = Vec::new();
    assert!(avro_datum::encode(&value, &schema, &mut out).is_err());
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_map_decode_blocks() -> TestResult {
    let schema = Schema::parse_str(MAP_OF_INTS)?;
    // a block of one entry, a block of -1 entries with its byte size, the end marker
    let input = hex!("02 0241 02  01 06 0242 04  00");
    assert_eq!(
        schema.binary_decode(&input)?,
        Value::map([("A", 1), ("B", 2)])
    );
    Ok(())
}
