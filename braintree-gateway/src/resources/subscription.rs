//! Subscription request and response models.
//!
//! [`SubscriptionRequest`] holds everything a caller may send on create or
//! update. Fields follow two presence rules:
//!
//! - `Option` fields are omitted when `None`.
//! - [`Nullable`] fields are omitted when unset, and always emitted when set,
//!   including `false` and `0`. On an update, an unset field is left unchanged by
//!   the gateway while a set `false` clears it.
//!
//! Mutually exclusive inputs (`billing_day_of_month` vs `first_billing_date`,
//! `never_expires` vs `number_of_billing_cycles`) are passed through as given;
//! the gateway decides and reports conflicts as validation errors.
//!
//! [`Subscription`] is the gateway's resolved view. Derived fields come back
//! computed: `billing_day_of_month` is always a string, and is filled in from
//! `first_billing_date` when the caller sent a date instead of a day.

use std::{convert::Infallible, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{Descriptor, Modification, ModificationGroup, wire_string_enum};
use crate::{
    codec,
    decimal::Decimal,
    error::GatewayError,
    nullable::{NullBool, NullInt64, Nullable},
};

/// Unit of a trial period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionTrialDurationUnit {
    /// Trial measured in days.
    Day,
    /// Trial measured in months.
    Month,
}

impl SubscriptionTrialDurationUnit {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
        }
    }
}

impl FromStr for SubscriptionTrialDurationUnit {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            other => Err(GatewayError::Decode(format!("unknown trial duration unit: {other}"))),
        }
    }
}

wire_string_enum!(SubscriptionTrialDurationUnit);

/// Lifecycle status reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionStatus {
    /// Billing normally.
    Active,
    /// Canceled; cannot be reactivated.
    Canceled,
    /// Ran out of billing cycles.
    Expired,
    /// A charge failed and the balance is outstanding.
    PastDue,
    /// Created with a future first billing date.
    Pending,
    /// A status this client does not know.
    Unrecognized,
}

impl SubscriptionStatus {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Canceled => "Canceled",
            Self::Expired => "Expired",
            Self::PastDue => "Past Due",
            Self::Pending => "Pending",
            Self::Unrecognized => "Unrecognized",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Active" => Self::Active,
            "Canceled" => Self::Canceled,
            "Expired" => Self::Expired,
            "Past Due" => Self::PastDue,
            "Pending" => Self::Pending,
            _ => Self::Unrecognized,
        })
    }
}

wire_string_enum!(SubscriptionStatus);

/// Update options. All five flags are always sent when the options block is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubscriptionOptions {
    /// Drop the add-ons and discounts the plan would otherwise contribute.
    #[serde(default, deserialize_with = "codec::flag")]
    pub do_not_inherit_add_ons_or_discounts: bool,
    /// Charge or credit the prorated difference when the price changes mid-cycle.
    #[serde(default, deserialize_with = "codec::flag")]
    pub prorate_charges: bool,
    /// Replace every existing add-on and discount with those in the request.
    #[serde(default, deserialize_with = "codec::flag")]
    pub replace_all_add_ons_and_discounts: bool,
    /// Undo the update if the prorated charge fails.
    #[serde(default, deserialize_with = "codec::flag")]
    pub revert_subscription_on_proration_failure: bool,
    /// Bill immediately instead of at the next billing date.
    #[serde(default, deserialize_with = "codec::flag")]
    pub start_immediately: bool,
}

/// Fields a caller may send to create or update a subscription.
///
/// # Examples
///
/// ```
/// use braintree_gateway::{
///     Decimal, SubscriptionRequest,
///     nullable::{NullBool, NullInt64},
/// };
///
/// let request = SubscriptionRequest {
///     payment_method_token: Some("token".into()),
///     plan_id: Some("test_plan".into()),
///     billing_day_of_month: NullInt64::of(15),
///     never_expires: NullBool::of(true),
///     price: Some(Decimal::new(100, 2).unwrap()),
///     ..SubscriptionRequest::default()
/// };
///
/// let xml = String::from_utf8(braintree_gateway::codec::encode(&request).unwrap()).unwrap();
/// assert!(xml.contains("<billing-day-of-month>15</billing-day-of-month>"));
/// assert!(xml.contains("<price>1.00</price>"));
/// assert!(!xml.contains("number-of-billing-cycles"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "subscription", rename_all = "kebab-case")]
pub struct SubscriptionRequest {
    /// Subscription id. Required for updates; optional custom id on create.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub id: Option<String>,
    /// Add-ons to attach at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_ons: Option<ModificationGroup>,
    /// Day of month to bill on (1-31, or 31 for the last day).
    #[serde(default, skip_serializing_if = "Nullable::is_null")]
    pub billing_day_of_month: NullInt64,
    /// Statement descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
    /// Discounts to attach at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<ModificationGroup>,
    /// Failed charge count to carry over (migrations).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub failure_count: Option<i64>,
    /// First date to bill on. Alternative to `billing_day_of_month`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub first_billing_date: Option<NaiveDate>,
    /// Merchant account to bill through.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub merchant_account_id: Option<String>,
    /// Bill until canceled. Alternative to `number_of_billing_cycles`.
    #[serde(default, skip_serializing_if = "Nullable::is_null")]
    pub never_expires: NullBool,
    /// Number of cycles to bill before expiring.
    #[serde(default, skip_serializing_if = "Nullable::is_null")]
    pub number_of_billing_cycles: NullInt64,
    /// Update options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SubscriptionOptions>,
    /// One-time nonce for a payment method.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub payment_method_nonce: Option<String>,
    /// Vaulted payment method token.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub payment_method_token: Option<String>,
    /// Plan the subscription follows.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub plan_id: Option<String>,
    /// Price overriding the plan price.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub price: Option<Decimal>,
    /// Trial length as sent by the caller; not validated locally.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub trial_duration: Option<String>,
    /// Unit of `trial_duration`.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "codec::optional")]
    pub trial_duration_unit: Option<SubscriptionTrialDurationUnit>,
    /// Start with a trial.
    #[serde(default, skip_serializing_if = "Nullable::is_null")]
    pub trial_period: NullBool,
}

/// A subscription as resolved by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "subscription", rename_all = "kebab-case")]
pub struct Subscription {
    /// Gateway id.
    #[serde(default)]
    pub id: String,
    /// Attached add-ons.
    #[serde(default, deserialize_with = "add_on_list")]
    pub add_ons: Vec<Modification>,
    /// Outstanding balance.
    #[serde(default, deserialize_with = "codec::optional")]
    pub balance: Option<Decimal>,
    /// Billing day, always a string (e.g. `"15"`).
    #[serde(default, deserialize_with = "codec::optional")]
    pub billing_day_of_month: Option<String>,
    /// Last day of the current billing period.
    #[serde(default, deserialize_with = "codec::optional")]
    pub billing_period_end_date: Option<NaiveDate>,
    /// First day of the current billing period.
    #[serde(default, deserialize_with = "codec::optional")]
    pub billing_period_start_date: Option<NaiveDate>,
    /// Creation time.
    #[serde(default, deserialize_with = "codec::optional")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "codec::optional")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Current billing cycle, starting at 1 after the first charge.
    #[serde(default, deserialize_with = "codec::optional")]
    pub current_billing_cycle: Option<i64>,
    /// Days since the subscription went past due.
    #[serde(default, deserialize_with = "codec::optional")]
    pub days_past_due: Option<i64>,
    /// Statement descriptor.
    #[serde(default)]
    pub descriptor: Option<Descriptor>,
    /// Attached discounts.
    #[serde(default, deserialize_with = "discount_list")]
    pub discounts: Vec<Modification>,
    /// Consecutive failed charges.
    #[serde(default, deserialize_with = "codec::optional")]
    pub failure_count: Option<i64>,
    /// First billing date.
    #[serde(default, deserialize_with = "codec::optional")]
    pub first_billing_date: Option<NaiveDate>,
    /// Merchant account billed through.
    #[serde(default, deserialize_with = "codec::optional")]
    pub merchant_account_id: Option<String>,
    /// Bills until canceled.
    #[serde(default)]
    pub never_expires: NullBool,
    /// Amount of the next charge.
    #[serde(default, deserialize_with = "codec::optional")]
    pub next_bill_amount: Option<Decimal>,
    /// Amount of the next full billing period.
    #[serde(default, deserialize_with = "codec::optional")]
    pub next_billing_period_amount: Option<Decimal>,
    /// Date of the next charge.
    #[serde(default, deserialize_with = "codec::optional")]
    pub next_billing_date: Option<NaiveDate>,
    /// Cycles to bill before expiring.
    #[serde(default)]
    pub number_of_billing_cycles: NullInt64,
    /// Date the subscription is paid through.
    #[serde(default, deserialize_with = "codec::optional")]
    pub paid_through_date: Option<NaiveDate>,
    /// Vaulted payment method token.
    #[serde(default, deserialize_with = "codec::optional")]
    pub payment_method_token: Option<String>,
    /// Plan id.
    #[serde(default)]
    pub plan_id: String,
    /// Recurring price.
    #[serde(default, deserialize_with = "codec::optional")]
    pub price: Option<Decimal>,
    /// Lifecycle status.
    #[serde(default, deserialize_with = "codec::optional")]
    pub status: Option<SubscriptionStatus>,
    /// Status changes, newest first.
    #[serde(default, deserialize_with = "status_event_list")]
    pub status_history: Vec<SubscriptionStatusEvent>,
    /// Trial length.
    #[serde(default, deserialize_with = "codec::optional")]
    pub trial_duration: Option<String>,
    /// Unit of `trial_duration`.
    #[serde(default, deserialize_with = "codec::optional")]
    pub trial_duration_unit: Option<SubscriptionTrialDurationUnit>,
    /// Started with a trial.
    #[serde(default)]
    pub trial_period: NullBool,
}

impl codec::Document for Subscription {
    const ROOT: &'static str = "subscription";
}

impl Subscription {
    /// Returns true if the gateway reports the subscription as canceled.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.status == Some(SubscriptionStatus::Canceled)
    }
}

/// One entry of a subscription's status history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "status-event", rename_all = "kebab-case")]
pub struct SubscriptionStatusEvent {
    /// Time of the change.
    #[serde(default, deserialize_with = "codec::optional")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Status entered.
    #[serde(default, deserialize_with = "codec::optional")]
    pub status: Option<SubscriptionStatus>,
    /// Balance at the time.
    #[serde(default, deserialize_with = "codec::optional")]
    pub balance: Option<Decimal>,
    /// Price at the time.
    #[serde(default, deserialize_with = "codec::optional")]
    pub price: Option<Decimal>,
    /// Currency of the amounts.
    #[serde(default, deserialize_with = "codec::optional")]
    pub currency_iso_code: Option<String>,
    /// Plan at the time.
    #[serde(default, deserialize_with = "codec::optional")]
    pub plan_id: Option<String>,
    /// What caused the change (`api`, `control_panel`, `recurring`).
    #[serde(default, deserialize_with = "codec::optional")]
    pub subscription_source: Option<String>,
    /// User that made the change, if any.
    #[serde(default, deserialize_with = "codec::optional")]
    pub user: Option<String>,
}

fn add_on_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Modification>, D::Error> {
    #[derive(Deserialize)]
    struct List {
        #[serde(default, rename = "add-on")]
        items: Vec<Modification>,
    }
    Ok(List::deserialize(deserializer)?.items)
}

fn discount_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Modification>, D::Error> {
    #[derive(Deserialize)]
    struct List {
        #[serde(default, rename = "discount")]
        items: Vec<Modification>,
    }
    Ok(List::deserialize(deserializer)?.items)
}

fn status_event_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<SubscriptionStatusEvent>, D::Error> {
    #[derive(Deserialize)]
    struct List {
        #[serde(default, rename = "status-event")]
        items: Vec<SubscriptionStatusEvent>,
    }
    Ok(List::deserialize(deserializer)?.items)
}
