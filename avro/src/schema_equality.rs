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
    Schema,
    schema::{NodeId, RecordField, SchemaNode},
};
use log::debug;
use std::{collections::HashSet, fmt::Debug, sync::OnceLock};

/// A trait that compares two schemata for equality.
/// To register a custom one use [set_schemata_equality_comparator].
pub trait SchemataEq: Debug + Send + Sync {
    /// Compares two schemata for equality.
    fn compare(&self, schema_one: &Schema, schema_two: &Schema) -> bool;
}

/// Compares two schemas according to the Avro specification by using
/// their canonical forms.
/// See <https://avro.apache.org/docs/1.11.1/specification/#parsing-canonical-form-for-schemas>
#[derive(Debug)]
pub struct SpecificationEq;
impl SchemataEq for SpecificationEq {
    fn compare(&self, schema_one: &Schema, schema_two: &Schema) -> bool {
        schema_one.canonical_form() == schema_two.canonical_form()
    }
}

/// Compares two schemas for equality node by node, starting at their roots.
///
/// Names, fields, symbols, sizes, member types and logical types are compared. Documentation,
/// aliases, defaults and the permissive flag are not. Neither is the layout of the node arena,
/// so a named type defined in one place and referenced in another compares equal to the same
/// type defined and referenced the other way around.
#[derive(Debug)]
pub struct StructFieldEq {
    /// Whether to include custom attributes in the comparison.
    /// The custom attributes are not used to construct the canonical form of the schema!
    pub include_attributes: bool,
}

impl SchemataEq for StructFieldEq {
    fn compare(&self, schema_one: &Schema, schema_two: &Schema) -> bool {
        Comparison {
            include_attributes: self.include_attributes,
            one: schema_one,
            two: schema_two,
            visited: HashSet::new(),
        }
        .nodes(schema_one.root_id(), schema_two.root_id())
    }
}

struct Comparison<'a> {
    include_attributes: bool,
    one: &'a Schema,
    two: &'a Schema,
    /// Pairs of nodes under comparison. Meeting one of them again means a recursive type.
    visited: HashSet<(NodeId, NodeId)>,
}

impl Comparison<'_> {
    #[rustfmt::skip]
    fn nodes(&mut self, id_one: NodeId, id_two: NodeId) -> bool {
        let (schema_one, schema_two) = (self.one, self.two);
        let id_one = schema_one.resolve(id_one);
        let id_two = schema_two.resolve(id_two);
        if !self.visited.insert((id_one, id_two)) {
            return true;
        }

        match (schema_one.node(id_one), schema_two.node(id_two)) {
            (SchemaNode::Null, SchemaNode::Null) => true,
            (SchemaNode::Null, _) => false,
            (SchemaNode::Boolean, SchemaNode::Boolean) => true,
            (SchemaNode::Boolean, _) => false,
            (SchemaNode::Int, SchemaNode::Int) => true,
            (SchemaNode::Int, _) => false,
            (SchemaNode::Long, SchemaNode::Long) => true,
            (SchemaNode::Long, _) => false,
            (SchemaNode::Float, SchemaNode::Float) => true,
            (SchemaNode::Float, _) => false,
            (SchemaNode::Double, SchemaNode::Double) => true,
            (SchemaNode::Double, _) => false,
            (SchemaNode::Bytes, SchemaNode::Bytes) => true,
            (SchemaNode::Bytes, _) => false,
            (SchemaNode::String, SchemaNode::String) => true,
            (SchemaNode::String, _) => false,
            (SchemaNode::Logical(one), SchemaNode::Logical(two)) => {
                one.logical_type == two.logical_type && self.nodes(one.inner, two.inner)
            }
            (SchemaNode::Logical(_), _) => false,
            (SchemaNode::Fixed(one), SchemaNode::Fixed(two)) => {
                one.name == two.name
                    && one.size == two.size
                    && (!self.include_attributes || one.attributes == two.attributes)
            }
            (SchemaNode::Fixed(_), _) => false,
            (SchemaNode::Enum(one), SchemaNode::Enum(two)) => {
                one.name == two.name
                    && one.symbols == two.symbols
                    && (!self.include_attributes || one.attributes == two.attributes)
            }
            (SchemaNode::Enum(_), _) => false,
            (SchemaNode::Array(one), SchemaNode::Array(two)) => {
                (!self.include_attributes || one.attributes == two.attributes)
                    && self.nodes(one.items, two.items)
            }
            (SchemaNode::Array(_), _) => false,
            (SchemaNode::Map(one), SchemaNode::Map(two)) => {
                (!self.include_attributes || one.attributes == two.attributes)
                    && self.nodes(one.values, two.values)
            }
            (SchemaNode::Map(_), _) => false,
            (SchemaNode::Union(one), SchemaNode::Union(two)) => {
                one.variants().len() == two.variants().len()
                    && one
                        .variants()
                        .iter()
                        .zip(two.variants())
                        .all(|(v1, v2)| self.nodes(*v1, *v2))
            }
            (SchemaNode::Union(_), _) => false,
            (SchemaNode::Record(one), SchemaNode::Record(two)) => {
                one.name == two.name
                    && (!self.include_attributes || one.attributes == two.attributes)
                    && self.fields(&one.fields, &two.fields)
            }
            (SchemaNode::Record(_), _) => false,
            // `resolve` never returns a reference
            (SchemaNode::Ref(_), _) => false,
        }
    }

    fn fields(&mut self, fields_one: &[RecordField], fields_two: &[RecordField]) -> bool {
        fields_one.len() == fields_two.len()
            && fields_one
                .iter()
                .zip(fields_two.iter())
                .all(|(f1, f2)| f1.name == f2.name && self.nodes(f1.schema, f2.schema))
    }
}

static SCHEMATA_COMPARATOR_ONCE: OnceLock<Box<dyn SchemataEq>> = OnceLock::new();

/// Sets a custom schemata equality comparator.
///
/// Returns a unit if the registration was successful or the already
/// registered comparator if the registration failed.
///
/// **Note**: This function must be called before comparing any schemata because this will
/// register the default comparator and the registration is one time only!
pub fn set_schemata_equality_comparator(
    comparator: Box<dyn SchemataEq>,
) -> Result<(), Box<dyn SchemataEq>> {
    debug!("Setting a custom schemata equality comparator: {comparator:?}.");
    SCHEMATA_COMPARATOR_ONCE.set(comparator)
}

pub(crate) fn compare_schemata(schema_one: &Schema, schema_two: &Schema) -> bool {
    SCHEMATA_COMPARATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default schemata equality comparator: StructFieldEq.",);
            Box::new(StructFieldEq {
                include_attributes: false,
            })
        })
        .compare(schema_one, schema_two)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use rstest::rstest;

    const SPECIFICATION_EQ: SpecificationEq = SpecificationEq;
    const STRUCT_FIELD_EQ: StructFieldEq = StructFieldEq {
        include_attributes: false,
    };
    const STRUCT_FIELD_EQ_WITH_ATTRS: StructFieldEq = StructFieldEq {
        include_attributes: true,
    };

    #[rstest]
    #[case(r#""null""#)]
    #[case(r#""boolean""#)]
    #[case(r#""int""#)]
    #[case(r#""long""#)]
    #[case(r#""float""#)]
    #[case(r#""double""#)]
    #[case(r#""bytes""#)]
    #[case(r#""string""#)]
    fn test_compare_primitives(#[case] raw: &str) -> TestResult {
        let schema_one = Schema::parse_str(raw)?;
        let schema_two = Schema::parse_str(raw)?;
        assert!(SPECIFICATION_EQ.compare(&schema_one, &schema_two));
        assert!(STRUCT_FIELD_EQ.compare(&schema_one, &schema_two));
        Ok(())
    }

    #[rstest]
    #[case::different_primitives(r#""int""#, r#""long""#)]
    #[case::different_items(
        r#"{"type": "array", "items": "int"}"#,
        r#"{"type": "array", "items": "long"}"#
    )]
    #[case::different_values(
        r#"{"type": "map", "values": "int"}"#,
        r#"{"type": "map", "values": "long"}"#
    )]
    #[case::different_names(
        r#"{"type": "fixed", "name": "A", "size": 4}"#,
        r#"{"type": "fixed", "name": "B", "size": 4}"#
    )]
    #[case::different_sizes(
        r#"{"type": "fixed", "name": "A", "size": 4}"#,
        r#"{"type": "fixed", "name": "A", "size": 5}"#
    )]
    #[case::different_symbols(
        r#"{"type": "enum", "name": "E", "symbols": ["A", "B"]}"#,
        r#"{"type": "enum", "name": "E", "symbols": ["B", "A"]}"#
    )]
    #[case::different_member_order(r#"["null", "int"]"#, r#"["int", "null"]"#)]
    #[case::different_field_names(
        r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int"}]}"#,
        r#"{"type": "record", "name": "R", "fields": [{"name": "b", "type": "int"}]}"#
    )]
    #[case::different_field_types(
        r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int"}]}"#,
        r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "long"}]}"#
    )]
    fn test_compare_different_schemata(#[case] raw_one: &str, #[case] raw_two: &str) -> TestResult {
        let schema_one = Schema::parse_str(raw_one)?;
        let schema_two = Schema::parse_str(raw_two)?;
        assert!(!SPECIFICATION_EQ.compare(&schema_one, &schema_two));
        assert!(!STRUCT_FIELD_EQ.compare(&schema_one, &schema_two));
        assert_ne!(schema_one, schema_two);
        Ok(())
    }

    #[test]
    fn test_compare_ignores_documentation_and_defaults() -> TestResult {
        let schema_one = Schema::parse_str(
            r#"{"type": "record", "name": "R", "doc": "one", "fields": [{"name": "a", "type": "int", "default": 1}]}"#,
        )?;
        let schema_two = Schema::parse_str(
            r#"{"type": "record", "name": "R", "fields": [{"name": "a", "type": "int", "aliases": ["b"]}]}"#,
        )?;
        assert!(SPECIFICATION_EQ.compare(&schema_one, &schema_two));
        assert!(STRUCT_FIELD_EQ.compare(&schema_one, &schema_two));
        Ok(())
    }

    #[test]
    fn test_compare_attributes() -> TestResult {
        let schema_one = Schema::parse_str(r#"{"type": "map", "values": "int", "x": 1}"#)?;
        let schema_two = Schema::parse_str(r#"{"type": "map", "values": "int", "x": 2}"#)?;
        assert!(STRUCT_FIELD_EQ.compare(&schema_one, &schema_two));
        assert!(!STRUCT_FIELD_EQ_WITH_ATTRS.compare(&schema_one, &schema_two));
        Ok(())
    }

    #[test]
    fn test_compare_logical_types() -> TestResult {
        let date = Schema::parse_str(r#"{"type": "int", "logicalType": "date"}"#)?;
        let int = Schema::parse_str(r#""int""#)?;
        assert!(SPECIFICATION_EQ.compare(&date, &int));
        assert!(!STRUCT_FIELD_EQ.compare(&date, &int));
        assert!(STRUCT_FIELD_EQ.compare(&date, &date.clone()));
        Ok(())
    }

    #[test]
    fn test_compare_references_independent_of_definition_site() -> TestResult {
        let schema_one = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "R",
                "fields": [
                    {"name": "a", "type": {"type": "fixed", "name": "F", "size": 2}},
                    {"name": "b", "type": "F"}
                ]
            }"#,
        )?;
        let schema_two = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "R",
                "fields": [
                    {"name": "a", "type": {"type": "fixed", "name": "F", "size": 2}},
                    {"name": "b", "type": {"type": "fixed", "name": "G", "size": 2}}
                ]
            }"#,
        )?;
        assert!(STRUCT_FIELD_EQ.compare(&schema_one, &schema_one.clone()));
        assert!(!STRUCT_FIELD_EQ.compare(&schema_one, &schema_two));
        Ok(())
    }

    #[test]
    fn test_compare_recursive_records() -> TestResult {
        let raw = r#"{
            "type": "record",
            "name": "Node",
            "fields": [
                {"name": "value", "type": "long"},
                {"name": "children", "type": {"type": "array", "items": "Node"}}
            ]
        }"#;
        let schema_one = Schema::parse_str(raw)?;
        let schema_two = Schema::parse_str(raw)?;
        assert!(STRUCT_FIELD_EQ.compare(&schema_one, &schema_two));
        assert_eq!(schema_one, schema_two);
        Ok(())
    }
}
