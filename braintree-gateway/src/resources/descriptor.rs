//! Statement descriptor.

use serde::{Deserialize, Serialize};

use crate::codec;

/// Text shown on the payer's card statement for charges from a subscription.
///
/// The gateway validates the formats (e.g. `Company*Product` names, 10-digit
/// phones); this client passes the values through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "descriptor")]
pub struct Descriptor {
    /// Business and product name.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub name: Option<String>,
    /// Customer service phone number.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub phone: Option<String>,
    /// Business URL.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub url: Option<String>,
}

impl Descriptor {
    /// Creates a descriptor with all three fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, phone: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: Some(name.into()), phone: Some(phone.into()), url: Some(url.into()) }
    }
}
