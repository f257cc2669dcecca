//! End-to-end adapter calls over the real HTTP transport against a mock gateway.

use std::time::Duration;

use paygap::{Code, ErrorKind, Metadata, SharedTransport};
use paygap_http::{HttpTransport, HttpTransportConfig};
use paygap_providers::idpay::{IdPay, PaymentRequest, TransactionListRequest};
use paygap_providers::payping::{self, PayPing};
use paygap_providers::zarinpal::Zarinpal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MERCHANT: &str = "1344b5d4-0048-11e8-94db-005056a205be";
const API_KEY: &str = "6a7f99eb-7c20-4412-a972-6dfb7cd253a4";

fn transport() -> SharedTransport {
    HttpTransport::new(HttpTransportConfig::default()).unwrap().shared()
}

fn idpay(server: &MockServer, sandbox: bool) -> IdPay {
    IdPay::builder()
        .transport(transport())
        .api_key(API_KEY)
        .sandbox(sandbox)
        .base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn idpay_create_transaction_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.1/payment"))
        .and(header("X-API-KEY", API_KEY))
        .and(header("X-SANDBOX", "1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "order_id": "101",
            "amount": 1000,
            "callback": "https://shop.example/callback"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "abc", "link": "https://pay/abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = PaymentRequest {
        order_id: "101".into(),
        amount: 1000,
        callback: "https://shop.example/callback".into(),
        ..Default::default()
    };
    let response = idpay(&server, true).create_transaction(&request).await.unwrap();
    assert_eq!(response.id, "abc");
    assert_eq!(response.link, "https://pay/abc");
}

#[tokio::test]
async fn idpay_transaction_list_pages_through_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.1/payment/transactions"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "10"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attachment": {"timestamp": 1, "total_count": 11, "page_count": 2, "page": 1, "page_size": 10},
            "records": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = TransactionListRequest {
        page: 1,
        page_size: 10,
        ..Default::default()
    };
    let response = idpay(&server, false).transaction_list(&request).await.unwrap();
    assert_eq!(response.attachment.total_count, 11);
}

#[tokio::test]
async fn zarinpal_rejection_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pg/v4/payment/verify.json"))
        .and(body_json(json!({"merchant_id": MERCHANT, "amount": 1000, "authority": "A123"})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -11, "message": "invalid authority"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let zarinpal = Zarinpal::builder()
        .transport(transport())
        .merchant_id(MERCHANT)
        .base_url(server.uri())
        .build()
        .unwrap();
    let err = zarinpal.verify_payment(1000, "A123").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderRejection);
    assert_eq!(err.code(), -11);
    assert_eq!(err.message(), "invalid authority");
    assert_eq!(err.http_status().as_u16(), 424);
    assert_eq!(err.rpc_code(), Code::Ok);
}

#[tokio::test]
async fn zarinpal_html_error_page_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let zarinpal = Zarinpal::builder()
        .transport(transport())
        .merchant_id(MERCHANT)
        .base_url(server.uri())
        .build()
        .unwrap();
    let err = zarinpal
        .request_payment(1000, "https://shop.example/back", "", "order", Metadata::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.rpc_code(), Code::Internal);
}

#[tokio::test]
async fn payping_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/pay"))
        .and(header("Authorization", "Bearer secret-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "c0de"})))
        .expect(1)
        .mount(&server)
        .await;

    let payping = PayPing::builder()
        .transport(transport())
        .api_token("secret-token-123")
        .base_url(server.uri())
        .build()
        .unwrap();
    let request = payping::PaymentRequest {
        amount: 1000,
        return_url: "https://shop.example/back".into(),
        ..Default::default()
    };
    let response = payping.request_payment(&request).await.unwrap();
    assert_eq!(response.code, "c0de");
}

#[tokio::test]
async fn slow_gateway_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(HttpTransportConfig::default().with_timeout(Duration::from_millis(50)))
        .unwrap()
        .shared();
    let idpay = IdPay::builder()
        .transport(transport)
        .api_key(API_KEY)
        .base_url(server.uri())
        .build()
        .unwrap();
    let request = PaymentRequest {
        order_id: "101".into(),
        amount: 1000,
        callback: "https://shop.example/callback".into(),
        ..Default::default()
    };
    let err = idpay.create_transaction(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.http_status().as_u16(), 500);
    assert!(err.message().contains("timed out"), "{err}");
}

#[tokio::test]
async fn caller_deadline_cancels_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let zarinpal = Zarinpal::builder()
        .transport(transport())
        .merchant_id(MERCHANT)
        .base_url(server.uri())
        .build()
        .unwrap();
    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        zarinpal.verify_payment(1000, "A123"),
    )
    .await;
    assert!(outcome.is_err());
}
