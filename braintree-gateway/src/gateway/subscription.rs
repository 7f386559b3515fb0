//! Subscription operations.

use std::time::Duration;

use tracing::{info, instrument};

use super::{Gateway, Verb, validate_resource_id};
use crate::{
    codec,
    error::{GatewayError, Result},
    resources::{Subscription, SubscriptionRequest},
    transport::Transport,
};

/// Create, update, find and cancel subscriptions.
///
/// Obtained from [`Gateway::subscription`]. Each method is one request; the
/// returned [`Subscription`] is the gateway's state after the call. Dropping a
/// returned future abandons the request.
#[derive(Debug)]
pub struct SubscriptionGateway<'g, T: Transport> {
    gateway: &'g Gateway<T>,
    timeout: Option<Duration>,
}

impl<T: Transport> Clone for SubscriptionGateway<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Transport> Copy for SubscriptionGateway<'_, T> {}

impl<'g, T: Transport> SubscriptionGateway<'g, T> {
    pub(crate) const fn new(gateway: &'g Gateway<T>) -> Self {
        Self { gateway, timeout: None }
    }

    /// Sets a deadline for each call made through this handle.
    ///
    /// The deadline covers the whole exchange and replaces the client-wide
    /// timeout from [`HttpConfig`](crate::transport::HttpConfig).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] if the gateway rejects the fields
    /// (conflicting billing start, unknown plan, ...), or any transport or
    /// status error.
    #[instrument(skip_all, fields(plan_id = request.plan_id.as_deref()))]
    pub async fn create(&self, request: &SubscriptionRequest) -> Result<Subscription> {
        let path = self.collection_path()?;
        let body = codec::encode(request)?;
        let subscription = self.send(Verb::Post, &path, Some(&body)).await?;
        info!(subscription_id = %subscription.id, "subscription created");
        Ok(subscription)
    }

    /// Updates the subscription named by `request.id`.
    ///
    /// Unset fields are left unchanged by the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if `request.id` is missing or not a
    /// valid id, without contacting the gateway. Otherwise as [`create`](Self::create).
    #[instrument(skip_all, fields(subscription_id = request.id.as_deref()))]
    pub async fn update(&self, request: &SubscriptionRequest) -> Result<Subscription> {
        let id = request
            .id
            .as_deref()
            .ok_or_else(|| GatewayError::InvalidInput("update requires a subscription id".to_owned()))?;
        let path = self.member_path(id)?;
        let body = codec::encode(request)?;
        self.send(Verb::Put, &path, Some(&body)).await
    }

    /// Fetches a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no subscription has this id.
    #[instrument(skip(self))]
    pub async fn find(&self, id: &str) -> Result<Subscription> {
        let path = self.member_path(id)?;
        self.send(Verb::Get, &path, None).await
    }

    /// Cancels a subscription.
    ///
    /// Not idempotent on this side: canceling twice returns whatever the gateway
    /// answers the second time (usually a validation error).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no subscription has this id.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: &str) -> Result<Subscription> {
        let path = format!("{}/cancel", self.member_path(id)?);
        let subscription = self.send(Verb::Put, &path, None).await?;
        info!(status = ?subscription.status, "subscription canceled");
        Ok(subscription)
    }

    fn collection_path(&self) -> Result<String> {
        Ok(format!("{}/subscriptions", self.gateway.merchant_path()?))
    }

    fn member_path(&self, id: &str) -> Result<String> {
        validate_resource_id("subscription id", id)?;
        Ok(format!("{}/{id}", self.collection_path()?))
    }

    async fn send(&self, verb: Verb, path: &str, body: Option<&[u8]>) -> Result<Subscription> {
        let response = self.gateway.execute(verb, path, body, self.timeout).await?;
        let subscription: Subscription = codec::decode_document(&response)?;
        if subscription.id.is_empty() {
            return Err(GatewayError::Decode("subscription response has no id".to_owned()));
        }
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Credentials, Environment, GatewayConfig},
        nullable::{NullBool, NullInt64},
        resources::{SubscriptionOptions, SubscriptionStatus},
        transport::mock::MockTransport,
    };

    const ACTIVE: &str = "<subscription><id>sub_1</id><plan-id>test_plan</plan-id><status>Active</status>\
        <billing-day-of-month>15</billing-day-of-month><never-expires>true</never-expires></subscription>";

    const CANCELED: &str =
        "<subscription><id>sub_1</id><plan-id>test_plan</plan-id><status>Canceled</status></subscription>";

    fn gateway(transport: MockTransport) -> Gateway<MockTransport> {
        let config = GatewayConfig::new(
            Environment::Development,
            Credentials::new("merchant_1", "public", "private"),
        );
        Gateway::with_transport(config, transport).unwrap()
    }

    #[tokio::test]
    async fn test_create_posts_to_collection() {
        let gateway = gateway(MockTransport::new().respond(201, ACTIVE));
        let request = SubscriptionRequest {
            plan_id: Some("test_plan".into()),
            billing_day_of_month: NullInt64::of(15),
            never_expires: NullBool::of(true),
            ..SubscriptionRequest::default()
        };

        let sub = gateway.subscription().create(&request).await.unwrap();
        assert_eq!(sub.id, "sub_1");
        assert_eq!(sub.billing_day_of_month.as_deref(), Some("15"));
        assert_eq!(sub.never_expires, NullBool::of(true));

        let sent = &gateway.transport().requests()[0];
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.path, "/merchants/merchant_1/subscriptions");
        let body = sent.body_text();
        assert!(body.contains("<plan-id>test_plan</plan-id>"));
        assert!(body.contains("<billing-day-of-month>15</billing-day-of-month>"));
        assert!(!body.contains("number-of-billing-cycles"));
    }

    #[tokio::test]
    async fn test_update_puts_to_member() {
        let gateway = gateway(MockTransport::new().respond(200, ACTIVE));
        let request = SubscriptionRequest {
            id: Some("sub_1".into()),
            plan_id: Some("test_plan_2".into()),
            options: Some(SubscriptionOptions {
                prorate_charges: true,
                revert_subscription_on_proration_failure: true,
                start_immediately: true,
                ..SubscriptionOptions::default()
            }),
            ..SubscriptionRequest::default()
        };

        gateway.subscription().update(&request).await.unwrap();

        let sent = &gateway.transport().requests()[0];
        assert_eq!(sent.method, "PUT");
        assert_eq!(sent.path, "/merchants/merchant_1/subscriptions/sub_1");
        let body = sent.body_text();
        assert!(body.contains("<options>"));
        assert!(body.contains("<start-immediately>true</start-immediately>"));
        assert!(!body.contains("never-expires"));
    }

    #[tokio::test]
    async fn test_update_without_id_sends_nothing() {
        let gateway = gateway(MockTransport::new());
        let err = gateway.subscription().update(&SubscriptionRequest::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
        assert!(gateway.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_find_gets_member() {
        let gateway = gateway(MockTransport::new().respond(200, ACTIVE));
        let sub = gateway.subscription().find("sub_1").await.unwrap();
        assert_eq!(sub.status, Some(SubscriptionStatus::Active));

        let sent = &gateway.transport().requests()[0];
        assert_eq!(sent.method, "GET");
        assert_eq!(sent.path, "/merchants/merchant_1/subscriptions/sub_1");
        assert!(sent.body.is_empty());
    }

    #[tokio::test]
    async fn test_find_rejects_unsafe_id() {
        let gateway = gateway(MockTransport::new());
        for id in ["", "../plans", "sub 1", "sub/1"] {
            let err = gateway.subscription().find(id).await.unwrap_err();
            assert!(matches!(err, GatewayError::InvalidInput(_)), "id {id:?}");
        }
        assert!(gateway.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_puts_to_cancel_path() {
        let gateway = gateway(MockTransport::new().respond(200, CANCELED));
        let sub = gateway.subscription().cancel("sub_1").await.unwrap();
        assert!(sub.is_canceled());

        let sent = &gateway.transport().requests()[0];
        assert_eq!(sent.method, "PUT");
        assert_eq!(sent.path, "/merchants/merchant_1/subscriptions/sub_1/cancel");
        assert!(sent.body.is_empty());
        assert_eq!(sent.content_type, None);
    }

    #[tokio::test]
    async fn test_cancel_missing_is_not_found() {
        let gateway = gateway(MockTransport::new().respond(404, ""));
        let err = gateway.subscription().cancel("nonexistent").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cancel_twice_surfaces_gateway_answer() {
        let already = r#"<api-error-response><errors><subscription><errors type="array"><error><code>81905</code><attribute type="symbol">status</attribute><message>Subscription has already been canceled.</message></error></errors></subscription></errors><message>Subscription has already been canceled.</message></api-error-response>"#;
        let gateway = gateway(MockTransport::new().respond(200, CANCELED).respond(422, already));

        gateway.subscription().cancel("sub_1").await.unwrap();
        let err = gateway.subscription().cancel("sub_1").await.unwrap_err();
        assert!(err.validation_errors().is_some_and(|e| e.has_code("81905")));
        assert_eq!(gateway.transport().requests().len(), 2);
    }

    #[tokio::test]
    async fn test_with_timeout_reaches_transport() {
        let gateway = gateway(MockTransport::new().respond(200, ACTIVE).respond(200, ACTIVE));
        let deadline = Duration::from_secs(3);

        gateway.subscription().with_timeout(deadline).find("sub_1").await.unwrap();
        gateway.subscription().find("sub_1").await.unwrap();

        let requests = gateway.transport().requests();
        assert_eq!(requests[0].timeout, Some(deadline));
        assert_eq!(requests[1].timeout, None);
    }

    #[tokio::test]
    async fn test_success_with_other_document_is_decode_error() {
        let bodies = [
            "<customer><id>cust_9</id><first-name>Jane</first-name></customer>",
            "<api-error-response><message>x</message></api-error-response>",
            "<subscription><plan-id>test_plan</plan-id></subscription>",
            "",
        ];
        for body in bodies {
            let gateway = gateway(MockTransport::new().respond(200, body));
            let err = gateway.subscription().find("sub_1").await.unwrap_err();
            assert!(matches!(err, GatewayError::Decode(_)), "body {body:?} gave {err:?}");
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let gateway = gateway(MockTransport::new().respond(200, "<subscription><price>abc</price></subscription>"));
        let err = gateway.subscription().find("sub_1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
