use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Payload carried by the genesis entry.
pub const GENESIS_MARKER: &str = "Genesis Block";

/// Opaque voter identity token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoterId(String);

impl VoterId {
    /// Parse a voter identity, trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TypeError::Empty { field: "voterId" });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VoterId {
    type Error = TypeError;

    /// Stored form: already trimmed and non-empty.
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let id = Self::parse(&raw)?;
        if id.0 != raw {
            return Err(TypeError::Padded { field: "voterId" });
        }
        Ok(id)
    }
}

impl From<VoterId> for String {
    fn from(id: VoterId) -> Self {
        id.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One voter's selection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "BallotFields")]
pub struct Ballot {
    voter_id: VoterId,
    candidate: String,
}

impl Ballot {
    /// Build a ballot. The candidate name is trimmed and must be non-empty.
    pub fn new(voter_id: VoterId, candidate: &str) -> Result<Self, TypeError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(TypeError::Empty { field: "candidate" });
        }
        Ok(Self {
            voter_id,
            candidate: candidate.to_string(),
        })
    }

    pub fn voter_id(&self) -> &VoterId {
        &self.voter_id
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BallotFields {
    voter_id: VoterId,
    candidate: String,
}

impl TryFrom<BallotFields> for Ballot {
    type Error = TypeError;

    fn try_from(fields: BallotFields) -> Result<Self, Self::Error> {
        let ballot = Self::new(fields.voter_id, &fields.candidate)?;
        if ballot.candidate != fields.candidate {
            return Err(TypeError::Padded { field: "candidate" });
        }
        Ok(ballot)
    }
}

/// What an entry carries.
///
/// On the wire the genesis payload is the bare string [`GENESIS_MARKER`] and a
/// vote is `{"voterId": .., "candidate": ..}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PayloadRepr", into = "PayloadRepr")]
pub enum EntryPayload {
    Genesis,
    Vote(Ballot),
}

impl EntryPayload {
    pub fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis)
    }

    pub fn ballot(&self) -> Option<&Ballot> {
        match self {
            Self::Genesis => None,
            Self::Vote(b) => Some(b),
        }
    }
}

impl From<Ballot> for EntryPayload {
    fn from(ballot: Ballot) -> Self {
        Self::Vote(ballot)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PayloadRepr {
    Marker(String),
    Vote(Ballot),
}

impl TryFrom<PayloadRepr> for EntryPayload {
    type Error = TypeError;

    fn try_from(repr: PayloadRepr) -> Result<Self, Self::Error> {
        match repr {
            PayloadRepr::Marker(m) if m == GENESIS_MARKER => Ok(Self::Genesis),
            PayloadRepr::Marker(m) => Err(TypeError::UnknownMarker(m)),
            PayloadRepr::Vote(b) => Ok(Self::Vote(b)),
        }
    }
}

impl From<EntryPayload> for PayloadRepr {
    fn from(payload: EntryPayload) -> Self {
        match payload {
            EntryPayload::Genesis => Self::Marker(GENESIS_MARKER.to_string()),
            EntryPayload::Vote(b) => Self::Vote(b),
        }
    }
}
