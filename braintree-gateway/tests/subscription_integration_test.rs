//! Subscription lifecycle against a local mock gateway.

use std::sync::Arc;

use braintree_gateway::{
    Credentials, Decimal, Environment, Gateway, GatewayConfig, GatewayError, Modification,
    ModificationGroup, SubscriptionOptions, SubscriptionRequest, SubscriptionStatus,
    nullable::{NullBool, NullInt64},
};
use chrono::NaiveDate;
use mockito::{Matcher, Server};

const MERCHANT_ID: &str = "integration_merchant_id";
const PUBLIC_KEY: &str = "8hghpwn86t9zffyy";
const PRIVATE_KEY: &str = "73ea657092c920d72bcd7dc6d09d103a";
const BASIC_AUTH: &str = "Basic OGhnaHB3bjg2dDl6ZmZ5eTo3M2VhNjU3MDkyYzkyMGQ3MmJjZDdkYzZkMDlkMTAzYQ==";
const COLLECTION: &str = "/merchants/integration_merchant_id/subscriptions";

fn gateway(server: &Server) -> Gateway {
    let config = GatewayConfig::new(
        Environment::Development,
        Credentials::new(MERCHANT_ID, PUBLIC_KEY, PRIVATE_KEY),
    )
    .with_base_url(server.url());
    Gateway::new(config).unwrap()
}

fn subscription_xml(id: &str, status: &str, extra: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<subscription>
  <id>{id}</id>
  <plan-id>test_plan</plan-id>
  <status>{status}</status>
  <price type="decimal">1.00</price>
  <payment-method-token>token_1</payment-method-token>
  {extra}
</subscription>"#
    )
}

fn base_request() -> SubscriptionRequest {
    SubscriptionRequest {
        payment_method_token: Some("token_1".into()),
        plan_id: Some("test_plan".into()),
        price: Some(Decimal::new(100, 2).unwrap()),
        ..SubscriptionRequest::default()
    }
}

#[tokio::test]
async fn test_create_with_billing_day_of_month() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", COLLECTION)
        .match_header("authorization", BASIC_AUTH)
        .match_header("x-apiversion", "4")
        .match_header("content-type", Matcher::Regex("application/xml".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<billing-day-of-month>15</billing-day-of-month>".into()),
            Matcher::Regex("<price>1.00</price>".into()),
            Matcher::Regex("<plan-id>test_plan</plan-id>".into()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/xml")
        .with_body(subscription_xml(
            "sub_day",
            "Active",
            r#"<billing-day-of-month type="integer">15</billing-day-of-month>"#,
        ))
        .create_async()
        .await;

    let request = SubscriptionRequest { billing_day_of_month: NullInt64::of(15), ..base_request() };
    let sub = gateway(&server).subscription().create(&request).await.unwrap();

    assert_eq!(sub.id, "sub_day");
    assert_eq!(sub.billing_day_of_month.as_deref(), Some("15"));
    assert_eq!(sub.price.map(|p| p.to_string()).as_deref(), Some("1.00"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_with_first_billing_date() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", COLLECTION)
        .match_body(Matcher::Regex("<first-billing-date>2025-12-31</first-billing-date>".into()))
        .with_status(201)
        .with_body(subscription_xml(
            "sub_date",
            "Pending",
            r#"<first-billing-date type="date">2025-12-31</first-billing-date>
               <billing-day-of-month type="integer">31</billing-day-of-month>"#,
        ))
        .create_async()
        .await;

    let request = SubscriptionRequest {
        first_billing_date: NaiveDate::from_ymd_opt(2025, 12, 31),
        ..base_request()
    };
    let sub = gateway(&server).subscription().create(&request).await.unwrap();

    assert_eq!(sub.billing_day_of_month.as_deref(), Some("31"));
    assert_eq!(sub.first_billing_date, NaiveDate::from_ymd_opt(2025, 12, 31));
    assert_eq!(sub.status, Some(SubscriptionStatus::Pending));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_never_expires() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", COLLECTION)
        .match_body(Matcher::Regex("<never-expires>true</never-expires>".into()))
        .with_status(201)
        .with_body(subscription_xml(
            "sub_forever",
            "Active",
            r#"<never-expires type="boolean">true</never-expires><number-of-billing-cycles nil="true"/>"#,
        ))
        .create_async()
        .await;

    let request = SubscriptionRequest { never_expires: NullBool::of(true), ..base_request() };
    let sub = gateway(&server).subscription().create(&request).await.unwrap();

    assert_eq!(sub.never_expires, NullBool::of(true));
    assert!(!sub.number_of_billing_cycles.valid);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_sends_modifications_in_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", COLLECTION)
        .match_body(Matcher::Regex(
            "<add-ons><add><item>.*?increase_10.*?</item><item>.*?increase_20.*?</item></add></add-ons>".into(),
        ))
        .with_status(201)
        .with_body(subscription_xml(
            "sub_mods",
            "Active",
            r#"<add-ons type="array">
                 <add-on><id>increase_10</id><amount>10.00</amount><quantity type="integer">2</quantity></add-on>
                 <add-on><id>increase_20</id><amount>20.00</amount><quantity type="integer">1</quantity></add-on>
               </add-ons>
               <discounts type="array"/>"#,
        ))
        .create_async()
        .await;

    let request = SubscriptionRequest {
        add_ons: Some(ModificationGroup::add([
            Modification::inherited_from("increase_10").with_quantity(2),
            Modification::inherited_from("increase_20"),
        ])),
        ..base_request()
    };
    let sub = gateway(&server).subscription().create(&request).await.unwrap();

    let ids: Vec<_> = sub.add_ons.iter().filter_map(|m| m.id.as_deref()).collect();
    assert_eq!(ids, ["increase_10", "increase_20"]);
    assert!(sub.discounts.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_update_omits_unset_fields() {
    let mut server = Server::new_async().await;
    let expected = concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        "<subscription><id>sub_1</id>",
        "<options>",
        "<do-not-inherit-add-ons-or-discounts>false</do-not-inherit-add-ons-or-discounts>",
        "<prorate-charges>true</prorate-charges>",
        "<replace-all-add-ons-and-discounts>false</replace-all-add-ons-and-discounts>",
        "<revert-subscription-on-proration-failure>true</revert-subscription-on-proration-failure>",
        "<start-immediately>false</start-immediately>",
        "</options>",
        "<plan-id>test_plan_2</plan-id>",
        "</subscription>",
    );
    let mock = server
        .mock("PUT", format!("{COLLECTION}/sub_1").as_str())
        .match_body(Matcher::Exact(expected.to_owned()))
        .with_status(200)
        .with_body(subscription_xml(
            "sub_1",
            "Active",
            r#"<never-expires type="boolean">true</never-expires>"#,
        ))
        .create_async()
        .await;

    let request = SubscriptionRequest {
        id: Some("sub_1".into()),
        plan_id: Some("test_plan_2".into()),
        options: Some(SubscriptionOptions {
            prorate_charges: true,
            revert_subscription_on_proration_failure: true,
            ..SubscriptionOptions::default()
        }),
        ..SubscriptionRequest::default()
    };
    let sub = gateway(&server).subscription().update(&request).await.unwrap();

    assert_eq!(sub.never_expires, NullBool::of(true));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_find_returns_status_history() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("{COLLECTION}/sub_1").as_str())
        .match_header("accept", "application/xml")
        .with_status(200)
        .with_body(subscription_xml(
            "sub_1",
            "Past Due",
            r#"<days-past-due type="integer">3</days-past-due>
               <status-history type="array">
                 <status-event><status>Past Due</status><price>1.00</price></status-event>
                 <status-event><status>Active</status><price>1.00</price></status-event>
               </status-history>"#,
        ))
        .create_async()
        .await;

    let sub = gateway(&server).subscription().find("sub_1").await.unwrap();

    assert_eq!(sub.status, Some(SubscriptionStatus::PastDue));
    assert_eq!(sub.days_past_due, Some(3));
    assert_eq!(sub.status_history.len(), 2);
    assert_eq!(sub.status_history[1].status, Some(SubscriptionStatus::Active));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_nonexistent_is_not_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", format!("{COLLECTION}/nonexistent/cancel").as_str())
        .with_status(404)
        .create_async()
        .await;

    let err = gateway(&server).subscription().cancel("nonexistent").await.unwrap_err();

    assert!(matches!(err, GatewayError::NotFound(_)));
    assert!(err.is_not_found());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_marks_canceled() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", format!("{COLLECTION}/sub_1/cancel").as_str())
        .with_status(200)
        .with_body(subscription_xml("sub_1", "Canceled", ""))
        .create_async()
        .await;

    let sub = gateway(&server).subscription().cancel("sub_1").await.unwrap();

    assert!(sub.is_canceled());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_validation_errors_by_field() {
    let mut server = Server::new_async().await;
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<api-error-response>
  <errors>
    <errors type="array"/>
    <subscription>
      <errors type="array">
        <error>
          <code>91904</code>
          <attribute type="symbol">plan_id</attribute>
          <message>Plan ID is invalid.</message>
        </error>
        <error>
          <code>91916</code>
          <attribute type="symbol">billing_day_of_month</attribute>
          <message>Billing Day of Month cannot be set with first billing date.</message>
        </error>
      </errors>
      <descriptor>
        <errors type="array">
          <error>
            <code>92201</code>
            <attribute type="symbol">name</attribute>
            <message>Descriptor name format is invalid.</message>
          </error>
        </errors>
      </descriptor>
    </subscription>
  </errors>
  <message>Plan ID is invalid.</message>
</api-error-response>"#;
    let mock = server.mock("POST", COLLECTION).with_status(422).with_body(body).create_async().await;

    let err = gateway(&server).subscription().create(&base_request()).await.unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert!(errors.has_code("91904"));
    assert!(errors.has_code("91916"));
    assert_eq!(errors.for_field("subscription.plan_id")[0].code, "91904");
    assert_eq!(errors.for_field("subscription.descriptor.name")[0].code, "92201");
    assert!(!err.is_retryable());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", format!("{COLLECTION}/sub_1").as_str()).with_status(401).create_async().await;

    let err = gateway(&server).subscription().find("sub_1").await.unwrap_err();

    assert!(matches!(err, GatewayError::Authentication(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_maintenance_is_retryable() {
    let mut server = Server::new_async().await;
    let mock = server.mock("GET", format!("{COLLECTION}/sub_1").as_str()).with_status(503).create_async().await;

    let err = gateway(&server).subscription().find("sub_1").await.unwrap_err();

    assert!(matches!(err, GatewayError::DownForMaintenance));
    assert!(err.is_retryable());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_document_with_ok_status_is_not_a_subscription() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("{COLLECTION}/sub_1").as_str())
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<api-error-response>
  <message>Plan ID is invalid.</message>
  <errors><errors type="array"/></errors>
</api-error-response>"#,
        )
        .create_async()
        .await;

    let err = gateway(&server).subscription().find("sub_1").await.unwrap_err();

    assert!(matches!(err, GatewayError::Decode(_)), "{err:?}");
    assert!(!err.is_retryable());
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shared_gateway_across_tasks() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("{COLLECTION}/sub_1").as_str())
        .with_status(200)
        .with_body(subscription_xml("sub_1", "Active", ""))
        .expect(4)
        .create_async()
        .await;

    let gateway = Arc::new(gateway(&server));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move { gateway.subscription().find("sub_1").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().id, "sub_1");
    }
    mock.assert_async().await;
}
