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

use regex_lite::Regex;
use serde_json::{Map, Value};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::{AvroResult, Error, error::Details, util::MapHelper};

/// Represents names for `record`, `enum` and `fixed` Avro schemas.
///
/// Each of these `Schema`s have a `fullname` composed of two parts:
///   * a name
///   * a namespace
///
/// More information about schema names can be found in the
/// [Avro specification](https://avro.apache.org/docs/++version++/specification/#names)
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name {
    /// The full name
    namespace_and_name: String,
    /// Start byte of the name part
    ///
    /// If this is zero, then there is no namespace.
    index_of_name: usize,
}

/// Represents the aliases for Named Schema
pub type Aliases = Option<Vec<Name>>;
/// Represents the namespace for Named Schema
pub type Namespace = Option<String>;
/// Represents the namespace for Named Schema
pub type NamespaceRef<'a> = Option<&'a str>;

impl Name {
    /// Create a new `Name`.
    /// Parses the optional `namespace` from the `name` string.
    pub fn new(name: &str) -> AvroResult<Self> {
        Self::new_with_enclosing_namespace(name, None)
    }

    /// Create a new `Name` using the namespace from `enclosing_namespace` if absent.
    pub fn new_with_enclosing_namespace(
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Self> {
        let index_of_name = validate_schema_name(name)?;

        if index_of_name == 0
            && let Some(namespace) = enclosing_namespace
            && !namespace.is_empty()
        {
            validate_namespace(namespace)?;
            Ok(Self {
                namespace_and_name: format!("{namespace}.{name}"),
                index_of_name: namespace.len() + 1,
            })
        } else if index_of_name == 1 {
            // Name has a leading dot
            Ok(Self {
                namespace_and_name: name[1..].into(),
                index_of_name: 0,
            })
        } else {
            Ok(Self {
                namespace_and_name: name.into(),
                index_of_name,
            })
        }
    }

    /// Parse the `name` and `namespace` attributes of a named schema.
    pub(crate) fn parse(
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Self> {
        let name_field = complex.name().ok_or(Details::GetNameField)?;
        let namespace = complex.string("namespace");
        Self::new_with_enclosing_namespace(
            &name_field,
            namespace.as_deref().or(enclosing_namespace),
        )
    }

    pub fn name(&self) -> &str {
        &self.namespace_and_name[self.index_of_name..]
    }

    pub fn namespace(&self) -> NamespaceRef<'_> {
        if self.index_of_name == 0 {
            None
        } else {
            Some(&self.namespace_and_name[..(self.index_of_name - 1)])
        }
    }

    /// Return the `fullname` of this `Name`
    ///
    /// More information about fullnames can be found in the
    /// [Avro specification](https://avro.apache.org/docs/++version++/specification/#names)
    pub fn fullname(&self) -> &str {
        &self.namespace_and_name
    }
}

impl TryFrom<&str> for Name {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Debug for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Name");
        debug.field("name", &self.name());
        if self.index_of_name != 0 {
            debug.field("namespace", &self.namespace());
            debug.finish()
        } else {
            debug.finish_non_exhaustive()
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.namespace_and_name)
    }
}

fn schema_name_regex() -> &'static Regex {
    static SCHEMA_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SCHEMA_NAME_ONCE.get_or_init(|| {
        Regex::new(
            // An optional namespace (with optional dots) followed by a name without any dots in it.
            r"^((?P<namespace>([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)$",
        )
        .expect("Regex is valid")
    })
}

fn namespace_regex() -> &'static Regex {
    static NAMESPACE_ONCE: OnceLock<Regex> = OnceLock::new();
    NAMESPACE_ONCE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?$")
            .expect("Regex is valid")
    })
}

fn simple_name_regex() -> &'static Regex {
    static SIMPLE_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SIMPLE_NAME_ONCE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex is valid"))
}

/// Validates the schema name and returns the start byte of the name part.
pub(crate) fn validate_schema_name(schema_name: &str) -> AvroResult<usize> {
    let regex = schema_name_regex();
    let caps = regex
        .captures(schema_name)
        .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()))?;
    caps.name("name")
        .map(|name| name.start())
        .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()).into())
}

pub(crate) fn validate_namespace(namespace: &str) -> AvroResult<()> {
    let regex = namespace_regex();
    if regex.is_match(namespace) {
        Ok(())
    } else {
        Err(Details::InvalidNamespace(namespace.to_string(), regex.as_str()).into())
    }
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    if simple_name_regex().is_match(symbol) {
        Ok(())
    } else {
        Err(Details::EnumSymbolName(symbol.to_string()).into())
    }
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    if simple_name_regex().is_match(field_name) {
        Ok(())
    } else {
        Err(Details::FieldName(field_name.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use pretty_assertions::assert_eq;

    #[test]
    /// Zero-length namespace is considered as no-namespace.
    fn test_namespace_from_name_with_empty_value() -> TestResult {
        let name = Name::new(".name")?;
        assert_eq!(name.namespace_and_name, "name");
        assert_eq!(name.index_of_name, 0);
        assert_eq!(name.namespace(), None);

        Ok(())
    }

    #[test]
    fn test_name_with_namespace() -> TestResult {
        let name = Name::new("com.example.User")?;
        assert_eq!(name.name(), "User");
        assert_eq!(name.namespace(), Some("com.example"));
        assert_eq!(name.fullname(), "com.example.User");
        Ok(())
    }

    #[test]
    fn test_enclosing_namespace_only_applies_to_simple_names() -> TestResult {
        let simple = Name::new_with_enclosing_namespace("User", Some("com.example"))?;
        assert_eq!(simple.fullname(), "com.example.User");

        let dotted = Name::new_with_enclosing_namespace("org.Other", Some("com.example"))?;
        assert_eq!(dotted.fullname(), "org.Other");

        let empty = Name::new_with_enclosing_namespace("User", Some(""))?;
        assert_eq!(empty.fullname(), "User");
        Ok(())
    }

    #[test]
    /// Whitespace is not allowed in the name.
    fn test_name_with_whitespace_value() {
        match Name::new(" ").map_err(Error::into_details) {
            Err(Details::InvalidSchemaName(_, _)) => {}
            _ => panic!("Expected an Details::InvalidSchemaName!"),
        }
    }

    #[test]
    /// The name must be non-empty.
    fn test_name_with_no_name_part() {
        match Name::new("space.").map_err(Error::into_details) {
            Err(Details::InvalidSchemaName(_, _)) => {}
            _ => panic!("Expected an Details::InvalidSchemaName!"),
        }
    }

    #[test]
    fn test_disallow_invalid_namespaces_in_fully_qualified_name() {
        for full_name in ["ns.0.record1", "ns..record1"] {
            match Name::new(full_name).map_err(Error::into_details) {
                Err(Details::InvalidSchemaName(name, _)) => assert_eq!(name, full_name),
                other => panic!("Expected an Details::InvalidSchemaName, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_enclosing_namespace() {
        assert!(Name::new_with_enclosing_namespace("User", Some("com-example")).is_err());
    }

    #[test]
    fn test_funny_valid_names_and_namespaces() {
        for funny_name in ["_", "_._", "__._", "_.__", "_._._"] {
            assert!(Name::new(funny_name).is_ok(), "{funny_name}");
        }
    }

    #[test]
    fn test_symbol_and_field_names() -> TestResult {
        validate_enum_symbol_name("spades")?;
        assert!(validate_enum_symbol_name("com-example").is_err());
        validate_record_field_name("test")?;
        assert!(validate_record_field_name("a.b").is_err());
        Ok(())
    }
}
