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

use crate::{AvroResult, error::Details};
use serde_json::{Map, Value};
use std::{
    io::Write,
    sync::{
        Once,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Maximum number of bytes that can be allocated when decoding
/// Avro-encoded values. This is a protection against ill-formed
/// data, whose length field might be interpreted as enormous.
/// See max_allocation_bytes to change this limit.
pub const DEFAULT_MAX_ALLOCATION_BYTES: usize = 512 * 1024 * 1024;
static MAX_ALLOCATION_BYTES: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_ALLOCATION_BYTES);
static MAX_ALLOCATION_BYTES_ONCE: Once = Once::new();

/// Set a new maximum number of bytes that can be allocated when decoding data.
/// Once called, the limit cannot be changed.
///
/// **NOTE** This function must be called before decoding **any** data. The
/// library leverages [`std::sync::Once`](https://doc.rust-lang.org/std/sync/struct.Once.html)
/// to set the limit either when calling this method, or when decoding for
/// the first time.
pub fn max_allocation_bytes(num_bytes: usize) -> usize {
    MAX_ALLOCATION_BYTES_ONCE.call_once(|| {
        MAX_ALLOCATION_BYTES.store(num_bytes, Ordering::Release);
    });
    MAX_ALLOCATION_BYTES.load(Ordering::Acquire)
}

pub fn safe_len(len: usize) -> AvroResult<usize> {
    let max_bytes = max_allocation_bytes(DEFAULT_MAX_ALLOCATION_BYTES);

    if len <= max_bytes {
        Ok(len)
    } else {
        Err(Details::MemoryAllocation {
            desired: len,
            maximum: max_bytes,
        }
        .into())
    }
}

pub(crate) trait MapHelper {
    fn string(&self, key: &str) -> Option<String>;

    fn name(&self) -> Option<String> {
        self.string("name")
    }

    fn doc(&self) -> Option<String> {
        self.string("doc")
    }

    fn aliases(&self) -> Option<Vec<String>>;
}

impl MapHelper for Map<String, Value> {
    fn string(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
    }

    fn aliases(&self) -> Option<Vec<String>> {
        self.get("aliases")
            .and_then(|aliases| aliases.as_array())
            .and_then(|aliases| {
                aliases
                    .iter()
                    .map(|alias| alias.as_str().map(|a| a.to_string()))
                    .collect::<Option<_>>()
            })
    }
}

pub fn zig_i32<W: Write>(n: i32, writer: W) -> AvroResult<usize> {
    zig_i64(i64::from(n), writer)
}

pub fn zig_i64<W: Write>(n: i64, writer: W) -> AvroResult<usize> {
    encode_variable(((n << 1) ^ (n >> 63)) as u64, writer)
}

/// Read a zig-zag encoded `long`, advancing `reader` past it.
pub fn zag_i64(reader: &mut &[u8]) -> AvroResult<i64> {
    let z = decode_variable(reader)?;
    Ok(if z & 0x1 == 0 {
        (z >> 1) as i64
    } else {
        !(z >> 1) as i64
    })
}

/// Read a zig-zag encoded `int`, advancing `reader` past it.
pub fn zag_i32(reader: &mut &[u8]) -> AvroResult<i32> {
    let i = zag_i64(reader)?;
    i32::try_from(i).map_err(|e| Details::ZagI32(e, i).into())
}

fn encode_variable<W: Write>(mut z: u64, mut writer: W) -> AvroResult<usize> {
    let mut buffer = [0u8; 10];
    let mut i: usize = 0;
    loop {
        if z <= 0x7F {
            buffer[i] = (z & 0x7F) as u8;
            i += 1;
            break;
        } else {
            buffer[i] = (0x80 | (z & 0x7F)) as u8;
            i += 1;
            z >>= 7;
        }
    }
    writer
        .write_all(&buffer[..i])
        .map_err(Details::WriteBytes)?;
    Ok(i)
}

fn decode_variable(reader: &mut &[u8]) -> AvroResult<u64> {
    let mut i = 0u64;
    let mut j = 0;
    loop {
        if j > 9 {
            // if j * 7 > 64
            return Err(Details::IntegerOverflow.into());
        }
        let Some((&byte, rest)) = reader.split_first() else {
            return Err(Details::ReadBytes {
                needed: 1,
                remaining: 0,
            }
            .into());
        };
        *reader = rest;
        i |= u64::from(byte & 0x7F) << (j * 7);
        if (byte >> 7) == 0 {
            break;
        } else {
            j += 1;
        }
    }

    Ok(i)
}

/// Split `len` bytes off the front of `reader`.
pub(crate) fn take<'a>(reader: &mut &'a [u8], len: usize) -> AvroResult<&'a [u8]> {
    if reader.len() < len {
        return Err(Details::ReadBytes {
            needed: len,
            remaining: reader.len(),
        }
        .into());
    }
    let (head, rest) = reader.split_at(len);
    *reader = rest;
    Ok(head)
}
