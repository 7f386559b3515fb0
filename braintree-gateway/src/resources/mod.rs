//! Gateway resource models.
//!
//! Each type declares its wire names through serde attributes, which makes the
//! attributes the field-to-element table for that resource. Requests serialize
//! to XML; responses deserialize from XML and serialize to JSON with the same
//! kebab-case names for display.

/// Implements `Display`, `Serialize` and `Deserialize` for an enum that travels as
/// a bare string, using its `as_str` and `FromStr` impls.
macro_rules! wire_string_enum {
    ($ty:ty) => {
        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> ::std::result::Result<Self, D::Error> {
                let text = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                text.trim().parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use wire_string_enum;

pub mod descriptor;
pub mod modification;
pub mod subscription;

pub use descriptor::Descriptor;
pub use modification::{Modification, ModificationGroup, ModificationKind};
pub use subscription::{
    Subscription, SubscriptionOptions, SubscriptionRequest, SubscriptionStatus,
    SubscriptionStatusEvent, SubscriptionTrialDurationUnit,
};
