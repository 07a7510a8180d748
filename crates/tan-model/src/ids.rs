#![deny(unsafe_code)]

use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
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
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Identifier of a clinical site.
    SiteId
);
id_type!(
    /// Identifier of a subject enrolled at a site.
    SubjectId
);
id_type!(
    /// Identifier of a study event (visit) for a subject.
    EventId
);
id_type!(
    /// Identifier of a procedure performed during an event.
    ProcedureId
);
id_type!(
    /// Identifier of a stored asset (media file).
    AssetId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = SiteId::new("SITE-042");
        assert_eq!(id.as_str(), "SITE-042");
        assert_eq!(id.to_string(), "SITE-042");
        assert_eq!(SiteId::from("SITE-042"), id);
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = SubjectId::new("1001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1001\"");
        let back: SubjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
