//! Discounts and add-ons.
//!
//! A [`Modification`] adjusts a subscription's recurring price. Plans define a
//! default set; a subscription inherits them and may add more at creation time
//! through a [`ModificationGroup`].

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::wire_string_enum;
use crate::{codec, decimal::Decimal, error::GatewayError};

/// Kind of modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModificationKind {
    /// Reduces the price (`discount`).
    Discount,
    /// Increases the price (`add_on`).
    AddOn,
}

impl ModificationKind {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::AddOn => "add_on",
        }
    }
}

impl FromStr for ModificationKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discount" => Ok(Self::Discount),
            "add_on" => Ok(Self::AddOn),
            other => Err(GatewayError::Decode(format!("unknown modification kind: {other}"))),
        }
    }
}

wire_string_enum!(ModificationKind);

/// A discount or add-on attached to a subscription.
///
/// Every field is optional on the wire; unset fields are omitted, never sent as
/// zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "modification", rename_all = "kebab-case")]
pub struct Modification {
    /// Gateway id. Empty for modifications inherited from a plan template.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub id: Option<String>,
    /// Amount overriding the plan-defined amount.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub amount: Option<Decimal>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub description: Option<String>,
    /// Discount or add-on.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub kind: Option<ModificationKind>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub name: Option<String>,
    /// Applies for every billing cycle.
    #[serde(default, skip_serializing_if = "codec::is_false", deserialize_with = "codec::flag")]
    pub never_expires: bool,
    /// Number of times the amount is applied per cycle.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub quantity: Option<i64>,
    /// Last change, as reported by the gateway.
    #[serde(
        rename = "updated_at",
        alias = "updated-at",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "codec::optional"
    )]
    pub updated_at: Option<String>,
    /// Plan-level modification this one overrides.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub inherited_from_id: Option<String>,
}

impl Modification {
    /// Creates a modification that overrides a plan-level one.
    #[must_use]
    pub fn inherited_from(id: impl Into<String>) -> Self {
        Self { inherited_from_id: Some(id.into()), ..Self::default() }
    }

    /// Sets the override amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Creation-time list of modifications to attach to a new subscription.
///
/// Encodes as `<add><item>...</item>...</add>`; order is preserved because the
/// gateway applies modifications in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationGroup {
    /// Modifications to add, in application order.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_items",
        deserialize_with = "deserialize_items"
    )]
    pub add: Vec<Modification>,
}

impl ModificationGroup {
    /// Creates a group that adds `modifications` in order.
    #[must_use]
    pub fn add(modifications: impl IntoIterator<Item = Modification>) -> Self {
        Self { add: modifications.into_iter().collect() }
    }
}

#[derive(Serialize)]
struct ItemsRef<'a> {
    item: &'a [Modification],
}

#[derive(Deserialize)]
struct Items {
    #[serde(default)]
    item: Vec<Modification>,
}

#[allow(clippy::ptr_arg, reason = "signature required by serde")]
fn serialize_items<S: Serializer>(items: &Vec<Modification>, serializer: S) -> Result<S::Ok, S::Error> {
    ItemsRef { item: items }.serialize(serializer)
}

fn deserialize_items<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Modification>, D::Error> {
    Ok(Items::deserialize(deserializer)?.item)
}
