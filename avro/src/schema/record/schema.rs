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

use crate::schema::{Aliases, Documentation, Name, RecordField};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// A description of a Record schema.
#[derive(Clone)]
pub struct RecordSchema {
    /// The name of the schema
    pub name: Name,
    /// The aliases of the schema
    pub aliases: Aliases,
    /// The documentation of the schema
    pub doc: Documentation,
    /// The set of fields of the schema
    pub fields: Vec<RecordField>,
    /// The `lookup` table maps field names and field aliases to their position in the `Vec`
    /// of `fields`.
    pub lookup: BTreeMap<String, usize>,
    /// The custom attributes of the schema
    pub attributes: BTreeMap<String, Value>,
}

impl RecordSchema {
    /// Find a field by its name or one of its aliases.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.lookup.get(name).and_then(|&i| self.fields.get(i))
    }
}

impl Debug for RecordSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("RecordSchema");
        debug.field("name", &self.name);
        if let Some(aliases) = &self.aliases {
            debug.field("aliases", aliases);
        }
        if let Some(doc) = &self.doc {
            debug.field("doc", doc);
        }
        debug.field("fields", &self.fields);
        if !self.attributes.is_empty() {
            debug.field("attributes", &self.attributes);
        }
        if self.aliases.is_none() || self.doc.is_none() || self.attributes.is_empty() {
            debug.finish_non_exhaustive()
        } else {
            debug.finish()
        }
    }
}
