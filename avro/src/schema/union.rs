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
use crate::schema::{EnumSchema, FixedSchema, NodeId, RecordSchema, Schema, SchemaKind, SchemaNode};
use std::collections::HashSet;

/// A description of a Union schema
#[derive(Debug, Clone)]
pub struct UnionSchema {
    /// The members of this union
    pub(crate) variants: Vec<NodeId>,
}

impl UnionSchema {
    pub(crate) fn new(variants: Vec<NodeId>) -> Self {
        Self { variants }
    }

    /// Returns a slice to all variants of this schema.
    pub fn variants(&self) -> &[NodeId] {
        &self.variants
    }

    /// Returns true if the any of the variants of this `UnionSchema` is `Null`.
    pub fn is_nullable(&self, schema: &Schema) -> bool {
        self.variants
            .iter()
            .any(|v| matches!(schema.node(schema.underlying(*v)), SchemaNode::Null))
    }

    /// Position of the first member whose branch name is `name`.
    pub fn find_branch(&self, schema: &Schema, name: &str) -> Option<usize> {
        self.variants
            .iter()
            .position(|v| schema.type_name(*v) == name)
    }

    /// Checks the Avro rules for union members once all references are resolved.
    ///
    /// A union may not directly contain another union, and may contain at most one member of
    /// each primitive kind and of each named type. Arrays and maps may be repeated. Logical
    /// types count as their underlying type.
    pub(crate) fn check_variants(&self, schema: &Schema) -> AvroResult<()> {
        let mut kinds: HashSet<SchemaKind> = HashSet::new();
        let mut names = HashSet::new();
        for variant in &self.variants {
            match schema.node(schema.underlying(*variant)) {
                SchemaNode::Union(_) => return Err(Details::GetNestedUnion.into()),
                SchemaNode::Array(_) | SchemaNode::Map(_) => {}
                SchemaNode::Record(RecordSchema { name, .. })
                | SchemaNode::Enum(EnumSchema { name, .. })
                | SchemaNode::Fixed(FixedSchema { name, .. }) => {
                    if !names.insert(name) {
                        return Err(Details::GetUnionDuplicate(name.to_string()).into());
                    }
                }
                node => {
                    let kind = SchemaKind::from(node);
                    if !kinds.insert(kind) {
                        return Err(Details::GetUnionDuplicate(kind.to_string()).into());
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Schema, TestResult, schema::SchemaNode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_branch() -> TestResult {
        let schema = Schema::parse_str(
            r#"["null", {"type": "map", "values": "int"}, {"type": "map", "values": "string"}, {"type": "enum", "name": "a.E", "symbols": ["X"]}]"#,
        )?;
        let SchemaNode::Union(union) = schema.root() else {
            panic!("Expected a union");
        };
        assert_eq!(union.find_branch(&schema, "null"), Some(0));
        assert_eq!(union.find_branch(&schema, "map"), Some(1));
        assert_eq!(union.find_branch(&schema, "a.E"), Some(3));
        assert_eq!(union.find_branch(&schema, "E"), None);
        Ok(())
    }

    #[test]
    fn test_nullable() -> TestResult {
        let schema = Schema::parse_str(r#"["int", "string"]"#)?;
        let SchemaNode::Union(union) = schema.root() else {
            panic!("Expected a union");
        };
        assert!(!union.is_nullable(&schema));
        Ok(())
    }
}
