use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declares a cheap-to-clone string identifier backed by `Arc<str>`.
///
/// Layout passes clone ids into every emitted command, so cloning must be a
/// refcount bump rather than a heap allocation.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Arc::from(id.as_ref()))
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                // Upstream payloads use numeric ids as often as string ids.
                match IdRepr::deserialize(deserializer)? {
                    IdRepr::Text(s) => Ok(Self::from(s)),
                    IdRepr::Int(n) => Ok(Self::from(n.to_string())),
                }
            }
        }
    };
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Int(i64),
}

string_id!(
    /// Unique identifier of a timeline item.
    ItemId
);

string_id!(
    /// Identifier of a row (a "group" in the rendering sense).
    RowId
);

string_id!(
    /// Name of a sub-lane partition inside a row.
    SubLaneKey
);
