// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

const BUFFER_TAG: &str = "Buffer";

/// Raw bytes that serialize in the tagged `{"type":"Buffer","data":[..]}` shape used for
/// encrypted input files. Reading also accepts a `0x` hex string or a bare byte array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Buffer {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

#[derive(Serialize)]
struct TaggedRef<'a> {
    #[serde(rename = "type")]
    tag: &'static str,
    data: &'a [u8],
}

#[derive(Deserialize)]
struct Tagged {
    #[serde(rename = "type")]
    tag: String,
    data: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyBuffer {
    Tagged(Tagged),
    Hex(String),
    Raw(Vec<u8>),
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedRef {
            tag: BUFFER_TAG,
            data: &self.0,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Buffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AnyBuffer::deserialize(deserializer)? {
            AnyBuffer::Tagged(tagged) if tagged.tag == BUFFER_TAG => Ok(Buffer(tagged.data)),
            AnyBuffer::Tagged(tagged) => Err(de::Error::custom(format!(
                "expected type \"{BUFFER_TAG}\", found \"{}\"",
                tagged.tag
            ))),
            AnyBuffer::Hex(s) => alloy::hex::decode(&s)
                .map(Buffer)
                .map_err(|e| de::Error::custom(format!("invalid hex buffer: {e}"))),
            AnyBuffer::Raw(bytes) => Ok(Buffer(bytes)),
        }
    }
}
