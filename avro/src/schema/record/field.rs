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

use crate::AvroResult;
use crate::error::Details;
use crate::schema::name::validate_record_field_name;
use crate::schema::parser::Parser;
use crate::schema::{Documentation, Name, NodeId};
use crate::types;
use crate::util::MapHelper;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum_macros::{AsRefStr, EnumString};

/// Represents a `field` in a `record` Avro schema.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    /// Name of the field.
    pub name: String,
    /// Documentation of the field.
    pub doc: Documentation,
    /// Aliases of the field's name. They have no namespace.
    pub aliases: Vec<String>,
    /// Default value of the field, as written in the schema.
    pub default: Option<Value>,
    /// Schema of the field.
    pub schema: NodeId,
    /// Order of the field.
    ///
    /// **NOTE** This currently has no effect.
    pub order: RecordFieldOrder,
    /// Position of the field in the list of `field` of its parent `Schema`
    pub position: usize,
    /// A collection of all unknown fields in the record field.
    pub custom_attributes: BTreeMap<String, Value>,
    /// `default` converted to a value of the field's schema, once names are resolved.
    pub(crate) default_value: Option<types::Value>,
}

/// Represents any valid order for a `field` in a `record` Avro schema.
#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab_case")]
pub enum RecordFieldOrder {
    Ascending,
    Descending,
    Ignore,
}

impl RecordField {
    /// Parse a `serde_json::Value` into a `RecordField`.
    pub(crate) fn parse(
        field: &Map<String, Value>,
        position: usize,
        parser: &mut Parser,
        enclosing_record: &Name,
    ) -> AvroResult<Self> {
        let name = field.name().ok_or(Details::GetNameFieldFromRecord)?;

        validate_record_field_name(&name)?;

        let schema = field
            .get("type")
            .ok_or_else(|| Details::GetComplexTypeField.into())
            .and_then(|typ| parser.parse(typ, enclosing_record.namespace()))?;

        let aliases = field.aliases().unwrap_or_default();

        let order = field
            .get("order")
            .and_then(|order| order.as_str())
            .and_then(|order| RecordFieldOrder::from_str(order).ok())
            .unwrap_or(RecordFieldOrder::Ascending);

        Ok(RecordField {
            name,
            doc: field.doc(),
            default: field.get("default").cloned(),
            aliases,
            order,
            position,
            custom_attributes: RecordField::get_field_custom_attributes(field),
            schema,
            default_value: None,
        })
    }

    fn get_field_custom_attributes(field: &Map<String, Value>) -> BTreeMap<String, Value> {
        let mut custom_attributes: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in field {
            match key.as_str() {
                "type" | "name" | "doc" | "default" | "order" | "aliases" => continue,
                _ => custom_attributes.insert(key.clone(), value.clone()),
            };
        }
        custom_attributes
    }

    /// The default value of this field, if it declares one.
    pub fn default_value(&self) -> Option<&types::Value> {
        self.default_value.as_ref()
    }

    /// Whether `name` is the name of this field or one of its aliases.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }
}
