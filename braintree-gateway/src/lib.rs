//! Braintree Gateway: typed client for the Braintree payment gateway API.
//!
//! The gateway speaks XML over HTTPS. This crate turns typed requests into
//! gateway documents, sends them to the merchant's resource endpoints, and turns
//! the answers back into typed resources or structured errors.
//!
//! # Partial updates and nullable fields
//!
//! Some fields need three states: "not sent", "sent as `false`/`0`" and "sent
//! with a value". On an update, "not sent" leaves the gateway's value alone while
//! `false` clears it. Those fields use [`Nullable`](nullable::Nullable), which is
//! omitted from the request body when unset and always emitted when set:
//!
//! ```rust
//! use braintree_gateway::{
//!     SubscriptionRequest, codec,
//!     nullable::{NullBool, NullInt64},
//! };
//!
//! let request = SubscriptionRequest {
//!     id: Some("sub_1".into()),
//!     never_expires: NullBool::of(false),
//!     number_of_billing_cycles: NullInt64::null(),
//!     ..SubscriptionRequest::default()
//! };
//!
//! let xml = String::from_utf8(codec::encode(&request).unwrap()).unwrap();
//! assert!(xml.contains("<never-expires>false</never-expires>"));
//! assert!(!xml.contains("number-of-billing-cycles"));
//! ```
//!
//! Amounts are [`Decimal`]s that keep their written scale (`1.00` stays
//! `1.00`) and never pass through a binary float.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use braintree_gateway::{
//!     Decimal, Gateway, SubscriptionRequest,
//!     config::GatewayConfig,
//!     nullable::NullInt64,
//! };
//!
//! # async fn example() -> braintree_gateway::Result<()> {
//! let gateway = Gateway::new(GatewayConfig::from_env()?)?;
//! let subscriptions = gateway.subscription();
//!
//! let created = subscriptions
//!     .create(&SubscriptionRequest {
//!         payment_method_token: Some("token".into()),
//!         plan_id: Some("test_plan".into()),
//!         billing_day_of_month: NullInt64::of(15),
//!         price: Some(Decimal::new(100, 2)?),
//!         ..SubscriptionRequest::default()
//!     })
//!     .await?;
//! assert_eq!(created.billing_day_of_month.as_deref(), Some("15"));
//!
//! let found = subscriptions.find(&created.id).await?;
//! subscriptions.cancel(&found.id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Every operation returns [`Result<T>`]. Validation errors keep each
//! gateway code addressable by field path, so callers can branch on them:
//!
//! ```rust,no_run
//! use braintree_gateway::{Gateway, GatewayError, SubscriptionRequest};
//!
//! # async fn example(gateway: Gateway) {
//! match gateway.subscription().create(&SubscriptionRequest::default()).await {
//!     Ok(sub) => println!("created {}", sub.id),
//!     Err(GatewayError::Validation(errors)) => {
//!         for error in errors.for_field("subscription.plan_id") {
//!             eprintln!("plan id rejected: {} ({})", error.message, error.code);
//!         }
//!     }
//!     Err(e) if e.is_retryable() => eprintln!("try again later: {e}"),
//!     Err(e) => eprintln!("failed: {e}"),
//! }
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`gateway`]: the [`Gateway`] client and resource operations
//! - [`resources`]: subscription, modification and descriptor models
//! - [`nullable`]: tri-state scalar wrappers
//! - [`decimal`]: exact currency amounts
//! - [`codec`]: XML encoding, decoding and error-document parsing
//! - [`transport`]: sealed transport abstraction and the reqwest implementation
//! - [`config`]: environments, credentials and HTTP settings
//! - [`error`]: error types

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod codec;
pub mod config;
pub mod decimal;
pub mod error;
pub mod gateway;
pub mod nullable;
pub mod resources;
pub mod transport;

pub use config::{Credentials, Environment, GatewayConfig};
pub use decimal::Decimal;
pub use error::{FieldError, GatewayError, Result, ValidationErrors};
pub use gateway::{Gateway, SubscriptionGateway};
pub use resources::{
    Descriptor, Modification, ModificationGroup, ModificationKind, Subscription,
    SubscriptionOptions, SubscriptionRequest, SubscriptionStatus, SubscriptionStatusEvent,
    SubscriptionTrialDurationUnit,
};
