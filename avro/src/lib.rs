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

//! A schema-driven codec for **[Apache Avro](https://avro.apache.org/)** datums.
//!
//! A [`Schema`] is parsed once from its JSON definition and can then be used, from any number
//! of threads, to:
//!
//! 1. check whether a [`Value`](types::Value) fits the schema ([`Schema::can_encode`]),
//! 2. encode and decode the compact binary representation ([`Schema::binary_encode`],
//!    [`Schema::binary_decode`]),
//! 3. encode and decode the JSON representation ([`Schema::json_encode`],
//!    [`Schema::json_decode`]).
//!
//! ```
//! use avro_datum::{Schema, types::Value};
//!
//! let schema = Schema::parse_str(r#"{"type": "map", "values": "int"}"#)?;
//! let value = Value::map([("A", 1), ("B", 2)]);
//!
//! let encoded = schema.binary_encode(&value)?;
//! assert_eq!(encoded, b"\x04\x02A\x02\x02B\x04\x00");
//! assert_eq!(schema.binary_decode(&encoded)?, value);
//! # Ok::<(), avro_datum::Error>(())
//! ```
//!
//! # Strict and permissive schemas
//!
//! By default values must have the representation the schema asks for. A schema built with
//! [`CodecOptions::permissive`](schema::CodecOptions) additionally accepts scalar to scalar
//! coercions, for example a number where a string is expected:
//!
//! ```
//! use avro_datum::{Schema, schema::CodecOptions, types::Value};
//!
//! let strict = Schema::parse_str(r#""string""#)?;
//! let permissive =
//!     Schema::parse_str_with_options(r#""string""#, CodecOptions::builder().permissive(true).build())?;
//!
//! assert!(!strict.can_encode(&Value::Long(0)));
//! assert!(permissive.can_encode(&Value::Long(0)));
//! assert!(!permissive.can_encode(&Value::Bytes(vec![])));
//! # Ok::<(), avro_datum::Error>(())
//! ```

mod decode;
mod encode;

pub mod error;
pub mod json;
pub mod schema;
pub mod schema_equality;
pub mod types;
pub mod util;
pub mod validator;

pub use decode::decode;
pub use encode::{encode, encode_to_vec};
pub use error::{Error, ErrorKind};
pub use schema::Schema;

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;

#[cfg(test)]
pub(crate) type TestResult = anyhow::Result<()>;
