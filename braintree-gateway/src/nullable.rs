//! Tri-state scalar fields.
//!
//! A plain `bool` cannot tell "leave this field alone" apart from "set it to
//! `false`", and on an update those are different gateway operations. A
//! [`Nullable`] carries a value together with a `valid` flag:
//!
//! - `valid == false`: the field is unset. The value is meaningless and the field is
//!   left out of the request body entirely.
//! - `valid == true`: the field is present, including `false` and `0`.
//!
//! Struct fields of this type are declared with
//! `#[serde(default, skip_serializing_if = "Nullable::is_null")]`, so decoding a
//! document without the element yields an invalid wrapper and encoding an invalid
//! wrapper emits nothing.
//!
//! # Examples
//!
//! ```
//! use braintree_gateway::nullable::{NullBool, NullInt64};
//!
//! let never_expires = NullBool::new(false, true);
//! assert_eq!(never_expires.get(), Some(false));
//!
//! let cycles = NullInt64::null();
//! assert!(cycles.is_null());
//! assert_eq!(cycles.get(), None);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Scalar value with an explicit presence flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Nullable<T> {
    /// The value. Only meaningful when `valid` is true.
    pub value: T,
    /// True if the field was provided by the caller or returned by the gateway.
    pub valid: bool,
}

/// Nullable boolean.
pub type NullBool = Nullable<bool>;

/// Nullable 64-bit integer.
pub type NullInt64 = Nullable<i64>;

impl<T> Nullable<T> {
    /// Creates a wrapper from a value and its presence flag.
    #[must_use]
    pub const fn new(value: T, valid: bool) -> Self {
        Self { value, valid }
    }

    /// Creates a present wrapper.
    #[must_use]
    pub const fn of(value: T) -> Self {
        Self { value, valid: true }
    }

    /// Returns true when the field is unset.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        !self.valid
    }

    /// Converts to an `Option`, dropping the value when unset.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        self.valid.then_some(self.value)
    }
}

impl<T: Copy> Nullable<T> {
    /// Returns the value if present.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.valid.then_some(self.value)
    }
}

impl<T: Default> Nullable<T> {
    /// Creates an unset wrapper.
    #[must_use]
    pub fn null() -> Self {
        Self { value: T::default(), valid: false }
    }
}

impl<T: Default> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Self::of)
    }
}

impl<T> From<Nullable<T>> for Option<T> {
    fn from(value: Nullable<T>) -> Self {
        value.into_option()
    }
}

impl<T: fmt::Display> fmt::Display for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid { self.value.fmt(f) } else { f.write_str("null") }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.valid { self.value.serialize(serializer) } else { serializer.serialize_none() }
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: FromStr + Default,
    T::Err: fmt::Display,
{
    /// Reads the element text. An empty or `nil="true"` element is unset; any
    /// other text must parse as `T`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed: Option<T> = crate::codec::optional(deserializer)?;
        Ok(parsed.into())
    }
}
