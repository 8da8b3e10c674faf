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
    Schema,
    schema::{CodecOptions, SchemaKind},
    types::Value,
};
use hex_literal::hex;
use pretty_assertions::assert_eq;
use rstest::rstest;

type TestResult = anyhow::Result<()>;

const POWER: &str = "Power\u{644}\u{64f}\u{644}\u{64f}\u{635}\u{651}\u{628}\u{64f}\u{644}\u{64f}\u{644}\u{635}\u{651}\u{628}\u{64f}\u{631}\u{631}\u{64b} \u{963} \u{963}h \u{963} \u{963}\u{5197}";

const POWER_ENCODED: [u8; 62] = hex!(
    "7a"
    "506f776572d984d98fd984d98fd8b5d9"
    "91d8a8d98fd984d98fd984d8b5d991d8"
    "a8d98fd8b1d8b1d98b20e0a5a320e0a5"
    "a36820e0a5a320e0a5a3e58697"
);

fn string_schema() -> Schema {
    Schema::parse_str(r#""string""#).unwrap()
}

fn permissive_string_schema() -> Schema {
    Schema::parse_str_with_options(
        r#""string""#,
        CodecOptions::builder().permissive(true).build(),
    )
    .unwrap()
}

#[test]
fn test_string_schema() {
    assert_eq!(string_schema().kind(), SchemaKind::String);
}

#[rstest]
#[case(&hex!("00"), "")]
#[case(&hex!("02 41"), "A")]
#[case(&hex!("04 4869"), "Hi")]
#[case(&hex!("04 c2a3"), "£")]
#[case(&hex!("08 f09f9880"), "😀")]
#[case(&hex!("0e 4f6e65 00 54776f"), "One\0Two")]
#[case(&POWER_ENCODED, POWER)]
fn test_string_binary(#[case] encoded: &[u8], #[case] raw: &str) -> TestResult {
    let schema = string_schema();
    assert_eq!(schema.binary_decode(encoded)?, Value::from(raw));
    assert_eq!(schema.binary_encode(&Value::from(raw))?, encoded);
    Ok(())
}

#[rstest]
#[case("", r#""""#)]
#[case("A", r#""A""#)]
#[case("Hi", r#""Hi""#)]
#[case("£", r#""\u00a3""#)]
#[case("\"", r#""\"""#)]
#[case("😀", r#""\ud83d\ude00""#)]
#[case("One\0Two", r#""One\u0000Two""#)]
#[case(
    POWER,
    r#""Power\u0644\u064f\u0644\u064f\u0635\u0651\u0628\u064f\u0644\u064f\u0644\u0635\u0651\u0628\u064f\u0631\u0631\u064b \u0963 \u0963h \u0963 \u0963\u5197""#
)]
fn test_string_json(#[case] raw: &str, #[case] expected: &str) -> TestResult {
    let schema = string_schema();
    assert_eq!(schema.json_encode(&Value::from(raw))?, expected);
    assert_eq!(schema.json_decode(expected)?, Value::from(raw));
    Ok(())
}

#[rstest]
#[case::empty(Value::from(""), true, true)]
#[case::wizard(Value::from("🧙🏽‍♀️"), true, true)]
#[case::int(Value::Long(0), false, true)]
#[case::float(Value::Double(0.1), false, true)]
#[case::bytes(Value::Bytes(vec![]), false, false)]
#[case::map(Value::map([("a", "b")]), false, false)]
#[case::sequence(Value::Array(vec![Value::from("")]), false, false)]
fn test_string_can_encode(#[case] value: Value, #[case] expected: bool, #[case] permissive: bool) {
    assert_eq!(string_schema().can_encode(&value), expected);
    assert_eq!(permissive_string_schema().can_encode(&value), permissive);
}

#[test]
fn test_string_encoding_decoding() -> TestResult {
    let schema = string_schema();
    let encoded = schema.binary_encode(&Value::from("abacus"))?;
    assert_eq!(schema.binary_decode(&encoded)?, Value::from("abacus"));
    Ok(())
}

#[test]
fn test_permissive_numbers_as_text() -> TestResult {
    let schema = permissive_string_schema();
    assert_eq!(schema.binary_encode(&Value::Long(0))?, hex!("02 30"));
    assert_eq!(schema.json_encode(&Value::Double(0.1))?, r#""0.1""#);
    assert!(string_schema().binary_encode(&Value::Long(0)).is_err());
    Ok(())
}
