//! Stored record encoding
//!
//! A record is a bincode-framed list of byte fields. The first field is
//! either a commitment or empty, which is enough to tell the node kinds apart
//! without a separate type tag:
//!
//! - `[[]]`: null marker for a vacated location
//! - `[[], path, value]`: leaf
//! - `[commitment, path]`: branch

use crate::error::{Error, Result};
use crate::model::{Bytes32, Field};

/// A decoded node record
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredRecord {
    Null,
    Leaf { path: Vec<u8>, value: Bytes32 },
    Branch { hash: Field, path: Vec<u8> },
}

impl StoredRecord {
    /// Short name of the record kind
    pub fn kind(&self) -> &'static str {
        match self {
            StoredRecord::Null => "null",
            StoredRecord::Leaf { .. } => "leaf",
            StoredRecord::Branch { .. } => "branch",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        const EMPTY: &[u8] = &[];
        let fields: Vec<&[u8]> = match self {
            StoredRecord::Null => vec![EMPTY],
            StoredRecord::Leaf { path, value } => vec![EMPTY, path.as_slice(), value.as_ref()],
            StoredRecord::Branch { hash, path } => vec![hash.as_ref(), path.as_slice()],
        };
        Ok(bincode::serialize(&fields)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut fields: Vec<Vec<u8>> = bincode::deserialize(data)?;
        if fields.is_empty() || fields.len() > 3 {
            return Err(Error::Corruption(format!(
                "record has {} fields",
                fields.len()
            )));
        }

        let head = fields.remove(0);
        if !head.is_empty() {
            let hash = Field::from_slice(&head).ok_or_else(|| {
                Error::Corruption(format!("commitment is {} bytes", head.len()))
            })?;
            return match fields.as_slice() {
                [path] => Ok(StoredRecord::Branch {
                    hash,
                    path: path.clone(),
                }),
                _ => Err(Error::Corruption(
                    "branch record must have exactly two fields".into(),
                )),
            };
        }

        match fields.as_slice() {
            [] => Ok(StoredRecord::Null),
            [path, value] => {
                let value = Bytes32::from_slice(value).ok_or_else(|| {
                    Error::Corruption(format!("leaf value is {} bytes", value.len()))
                })?;
                Ok(StoredRecord::Leaf {
                    path: path.clone(),
                    value,
                })
            }
            _ => Err(Error::Corruption("leaf record is missing its value".into())),
        }
    }
}
