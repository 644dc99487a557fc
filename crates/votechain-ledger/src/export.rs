use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// A chain as handed to auditors: `{"chain": [entry, ...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainExport {
    pub chain: Vec<Entry>,
}

impl ChainExport {
    pub fn new(chain: Vec<Entry>) -> Self {
        Self { chain }
    }

    /// Parse either the wrapped form or a bare JSON array of entries.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Wrapped(ChainExport),
            Bare(Vec<Entry>),
        }

        Ok(match serde_json::from_str(text)? {
            Repr::Wrapped(export) => export,
            Repr::Bare(chain) => Self { chain },
        })
    }
}
