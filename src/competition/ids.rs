//! Strongly typed identifiers
//!
//! Every aggregate and record is addressed by its own id type so that an entry id can never
//! be passed where a judge id is expected. Ids are plain strings on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh random id
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identifier of a competition
    CompetitionId
);
define_id!(
    /// Identifier of a category within a competition
    CategoryId
);
define_id!(
    /// Identifier of a competing player
    CompetitorId
);
define_id!(EntryId);
define_id!(JudgeId);
define_id!(SessionId);
define_id!(
    /// Identifier of the cultivated plant behind a submission
    PlantId
);
define_id!(RegistrationId);
define_id!(PrizeId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = CompetitionId::new("summer-cup");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"summer-cup\"");

        let back: CompetitionId = serde_json::from_str("\"summer-cup\"").unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "summer-cup");
    }
}
