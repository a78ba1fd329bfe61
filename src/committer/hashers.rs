//! Hash-based reference committers

use super::Committer;
use crate::model::Field;
use sha2::{Digest, Sha256};

/// Commits by hashing the concatenated elements with BLAKE3
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Committer;

impl Committer for Blake3Committer {
    fn commit(&self, elements: &[Field]) -> Field {
        let mut hasher = blake3::Hasher::new();
        for element in elements {
            hasher.update(element.as_bytes());
        }
        Field::from_bytes(*hasher.finalize().as_bytes())
    }
}

/// Commits by hashing the concatenated elements with SHA-256
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Committer;

impl Committer for Sha256Committer {
    fn commit(&self, elements: &[Field]) -> Field {
        let mut hasher = Sha256::new();
        for element in elements {
            hasher.update(element.as_bytes());
        }
        Field::from_bytes(hasher.finalize().into())
    }
}
