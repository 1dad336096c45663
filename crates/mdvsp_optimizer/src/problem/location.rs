use serde::{Deserialize, Serialize};

use crate::define_index_newtype;

define_index_newtype!(LocationIdx, Location);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Depot,
    Station,
}

/// A place where vehicles are parked (depot) or where trips start and end
/// (station).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    kind: LocationKind,
}

impl Location {
    pub fn depot() -> Self {
        Self {
            kind: LocationKind::Depot,
        }
    }

    pub fn station() -> Self {
        Self {
            kind: LocationKind::Station,
        }
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    pub fn is_depot(&self) -> bool {
        self.kind == LocationKind::Depot
    }
}
