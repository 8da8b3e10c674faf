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
    schema::{Name, SchemaKind},
    types::{Value, ValueKind},
};
use std::{error::Error as _, fmt};

/// Errors encountered while parsing schemas or encoding and decoding datums.
///
/// To inspect the details of the error use [`details`](Self::details) or
/// [`into_details`](Self::into_details). Use [`kind`](Self::kind) to find out in which phase the
/// error happened.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }

    /// The phase this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        self.details.kind()
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// The three families of errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The schema definition is malformed or cannot be resolved.
    ///
    /// Only raised while constructing a [`Schema`](crate::Schema).
    Schema,
    /// A value (or a nested element, key or field) does not fit the schema.
    Encode,
    /// The binary input or the JSON text is not a valid encoding for the schema.
    Decode,
}

#[derive(thiserror::Error)]
pub enum Details {
    // Schema errors
    #[error("Failed to parse schema from JSON")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Must be a JSON string, object or array")]
    ParseSchemaFromValidJson,

    #[error("Unknown primitive type: {0}. Did you mean '{1}'?")]
    ParsePrimitiveSimilar(String, &'static str),

    #[error(
        "Invalid schema: There is no type called '{0}', if you meant to define a non-primitive schema, it should be defined inside `type` attribute"
    )]
    InvalidSchemaRecord(String),

    #[error("Unknown complex type: {0}")]
    GetComplexType(serde_json::Value),

    #[error("No `type` in complex type")]
    GetComplexTypeField,

    #[error("No `name` field")]
    GetNameField,

    #[error("No `name` in record field")]
    GetNameFieldFromRecord,

    #[error("Invalid schema name {0}. It must match the regex '{1}'")]
    InvalidSchemaName(String, &'static str),

    #[error("Invalid namespace {0}. It must match the regex '{1}'")]
    InvalidNamespace(String, &'static str),

    #[error("Two named schema defined for same fullname: {0}.")]
    AmbiguousSchemaDefinition(Name),

    #[error("Unresolved schema reference: {0}")]
    SchemaResolutionError(Name),

    #[error("No `fields` in record")]
    GetRecordFieldsJson,

    #[error("Invalid field name {0}")]
    FieldName(String),

    #[error("Duplicate field name {0}")]
    FieldNameDuplicate(String),

    #[error("Invalid default value for field '{field}' of record {record}: {reason}")]
    GetDefaultRecordField {
        field: String,
        record: String,
        reason: String,
    },

    #[error("No `symbols` field in enum")]
    GetEnumSymbolsField,

    #[error("Unable to parse `symbols` in enum")]
    GetEnumSymbols,

    #[error("Invalid enum symbol name {0}")]
    EnumSymbolName(String),

    #[error("Duplicate enum symbol {0}")]
    EnumSymbolDuplicate(String),

    #[error("Enum default {symbol:?} is not among allowed symbols {symbols:?}")]
    GetEnumDefault {
        symbol: String,
        symbols: Vec<String>,
    },

    #[error("Default value for enum must be a string! Got: {0}")]
    EnumDefaultWrongType(serde_json::Value),

    #[error("No `items` in array")]
    GetArrayItemsField,

    #[error("No `values` in map")]
    GetMapValuesField,

    #[error("Fixed schema has no `size`")]
    GetFixedSizeField,

    #[error("Fixed schema `size` value must be a positive integer: {0}")]
    GetFixedSizeFieldPositive(serde_json::Value),

    #[error("Unions may not directly contain a union")]
    GetNestedUnion,

    #[error("Unions cannot contain duplicate types, found {0} twice")]
    GetUnionDuplicate(String),

    #[error("Union type should not be empty")]
    EmptyUnion,

    #[error("logicalType must be a string, but is {0:?}")]
    GetLogicalTypeFieldType(serde_json::Value),

    // Encode errors
    #[error("Value {value:?} at {path} does not match schema {schema}: {reason}")]
    ValidationWithReason {
        path: String,
        value: Value,
        schema: SchemaKind,
        reason: String,
    },

    #[error("Map key at {path} is not a string; key type is {kind:?}")]
    MapKeyType { path: String, kind: ValueKind },

    #[error("Value {value:?} at {path} matches more than one union branch: {branches:?}")]
    AmbiguousUnion {
        path: String,
        value: Value,
        branches: Vec<usize>,
    },

    #[error("failed to convert avro float to json: {0}")]
    ConvertF64ToJson(f64),

    #[error("Failed to convert JSON to string: {0}")]
    ConvertJsonToString(#[source] serde_json::Error),

    #[error("Failed to write bytes: {0}")]
    WriteBytes(#[source] std::io::Error),

    // Decode errors
    #[error("Unexpected end of input: {needed} more bytes needed, {remaining} available")]
    ReadBytes { needed: usize, remaining: usize },

    #[error("Overflow when decoding integer value")]
    IntegerOverflow,

    #[error("Decoded integer out of range for i32: {1}: {0}")]
    ZagI32(#[source] std::num::TryFromIntError, i64),

    #[error("Invalid u8 for bool: {0}")]
    BoolValue(u8),

    #[error("Negative length: {0}")]
    NegativeLength(i64),

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("Invalid utf-8 string")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Union index {index} out of bounds: {num_variants}")]
    GetUnionVariant { index: i64, num_variants: usize },

    #[error("Enum value index {index} is out of bounds {nsymbols}")]
    GetEnumValue { index: i64, nsymbols: usize },

    #[error("{0} trailing bytes after the decoded value")]
    TrailingBytes(usize),

    #[error("Failed to parse JSON datum")]
    ParseJson(#[source] serde_json::Error),

    #[error("Expected {expected} at {path}, got JSON {found}")]
    JsonTypeMismatch {
        path: String,
        expected: SchemaKind,
        found: serde_json::Value,
    },

    #[error("Missing field '{field}' without default at {path}")]
    JsonMissingField { path: String, field: String },

    #[error("Union at {path} has no branch named {name:?}")]
    JsonUnionBranch { path: String, name: String },

    #[error("Code point {0:?} cannot be represented as a byte")]
    JsonByteCodePoint(char),

    #[error("Fixed size mismatch, expected: {size}, got: {n}")]
    CompareFixedSizes { size: usize, n: usize },

    #[error("Enum symbol {symbol:?} at {path} is not one of {symbols:?}")]
    JsonEnumSymbol {
        path: String,
        symbol: String,
        symbols: Vec<String>,
    },
}

impl Details {
    /// The phase this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Details::ParseSchemaJson(_)
            | Details::ParseSchemaFromValidJson
            | Details::ParsePrimitiveSimilar(_, _)
            | Details::InvalidSchemaRecord(_)
            | Details::GetComplexType(_)
            | Details::GetComplexTypeField
            | Details::GetNameField
            | Details::GetNameFieldFromRecord
            | Details::InvalidSchemaName(_, _)
            | Details::InvalidNamespace(_, _)
            | Details::AmbiguousSchemaDefinition(_)
            | Details::SchemaResolutionError(_)
            | Details::GetRecordFieldsJson
            | Details::FieldName(_)
            | Details::FieldNameDuplicate(_)
            | Details::GetDefaultRecordField { .. }
            | Details::GetEnumSymbolsField
            | Details::GetEnumSymbols
            | Details::EnumSymbolName(_)
            | Details::EnumSymbolDuplicate(_)
            | Details::GetEnumDefault { .. }
            | Details::EnumDefaultWrongType(_)
            | Details::GetArrayItemsField
            | Details::GetMapValuesField
            | Details::GetFixedSizeField
            | Details::GetFixedSizeFieldPositive(_)
            | Details::GetNestedUnion
            | Details::GetUnionDuplicate(_)
            | Details::EmptyUnion
            | Details::GetLogicalTypeFieldType(_) => ErrorKind::Schema,

            Details::ValidationWithReason { .. }
            | Details::MapKeyType { .. }
            | Details::AmbiguousUnion { .. }
            | Details::ConvertF64ToJson(_)
            | Details::ConvertJsonToString(_)
            | Details::WriteBytes(_) => ErrorKind::Encode,

            Details::ReadBytes { .. }
            | Details::IntegerOverflow
            | Details::ZagI32(_, _)
            | Details::BoolValue(_)
            | Details::NegativeLength(_)
            | Details::MemoryAllocation { .. }
            | Details::ConvertToUtf8(_)
            | Details::GetUnionVariant { .. }
            | Details::GetEnumValue { .. }
            | Details::TrailingBytes(_)
            | Details::ParseJson(_)
            | Details::JsonTypeMismatch { .. }
            | Details::JsonMissingField { .. }
            | Details::JsonUnionBranch { .. }
            | Details::JsonByteCodePoint(_)
            | Details::CompareFixedSizes { .. }
            | Details::JsonEnumSymbol { .. } => ErrorKind::Decode,
        }
    }
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut msg = self.to_string();
        if let Some(e) = self.source() {
            msg.extend([": ", &e.to_string()]);
        }
        write!(f, "{msg}")
    }
}
