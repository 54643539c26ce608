use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;

use super::*;
use crate::app_system::StoreSystem;
use crate::cart::CartItem;
use crate::clients::OrderClient;
use crate::domain::{Order, OrderStatus, ProfileCreate, ShippingDetails};
use crate::fakes::{FakeGateway, RecordingMailer};

const SECRET: &str = "sk_test_webhook";

struct Harness {
    service: PaymentService,
    gateway: Arc<FakeGateway>,
    mailer: Arc<RecordingMailer>,
    system: StoreSystem,
}

fn harness_with(gateway: FakeGateway, mailer: RecordingMailer) -> Harness {
    let system = StoreSystem::in_memory();
    let gateway = Arc::new(gateway);
    let mailer = Arc::new(mailer);
    let service = PaymentService::new(
        gateway.clone(),
        mailer.clone(),
        system.order_client.clone(),
        system.profile_client.clone(),
        PaymentSettings {
            secret_key: SECRET.to_string(),
            app_url: "https://knots.test/".to_string(),
            shipping_cost: Decimal::from(100),
        },
    );
    Harness {
        service,
        gateway,
        mailer,
        system,
    }
}

fn harness() -> Harness {
    harness_with(FakeGateway::default(), RecordingMailer::default())
}

fn init_request() -> PaymentInitRequest {
    PaymentInitRequest {
        email: "anke@example.co.za".to_string(),
        amount: None,
        shipping_details: ShippingDetails {
            full_name: "Anke du Toit".to_string(),
            email: "anke@example.co.za".to_string(),
            phone: "0821234567".to_string(),
            address_line1: "12 Kerk Street".to_string(),
            address_line2: None,
            city: "Stellenbosch".to_string(),
            state_province: "Western Cape".to_string(),
            postal_code: "7600".to_string(),
            country: "South Africa".to_string(),
            coordinates: None,
        },
        cart: vec![CartItem {
            id: "prod-karoo-Sage-Skinny".to_string(),
            product_id: "prod-karoo".to_string(),
            title: "The Karoo".to_string(),
            price: Decimal::new(24999, 2),
            image: None,
            options_text: "Color: Sage, Width: Skinny".to_string(),
            quantity: 2,
        }],
        language_preference: Some("af".to_string()),
        subtotal: Some(Decimal::new(49998, 2)),
        user_id: None,
    }
}

fn success_body(reference: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "event": "charge.success",
        "data": {
            "reference": reference,
            "status": "success",
            "amount": 59998,
            "customer": {"email": "anke@example.co.za"},
            "metadata": {
                "shipping_details": {"full_name": "Anke du Toit", "email": "anke@example.co.za"},
                "cart": [
                    {"id": "prod-karoo-Sage-Skinny", "productId": "prod-karoo", "title": "The Karoo", "price": "249.99", "quantity": 2}
                ],
                "language_preference": "af",
                "subtotal": "499.98",
                "shipping_cost": "100"
            }
        }
    }))
    .unwrap()
}

async fn deliver(h: &Harness, body: &[u8]) -> Result<WebhookOutcome, PaymentError> {
    let signature = signature::sign(SECRET, body);
    h.service.handle_webhook(body, Some(&signature)).await
}

async fn wait_for_order(orders: &OrderClient, reference: &str) -> Order {
    for _ in 0..100 {
        if let Some(order) = orders.get_order(reference.to_string()).await.unwrap() {
            return order;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("order {reference} never appeared");
}

async fn wait_for_emails(mailer: &RecordingMailer, count: usize) {
    for _ in 0..100 {
        if mailer.sent().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} emails, saw {}", mailer.sent().len());
}

#[tokio::test]
async fn init_opens_session_and_records_pending_order() {
    let h = harness();

    let response = h.service.initialize(init_request()).await.unwrap();
    assert_eq!(response.reference, "ref_1");
    assert_eq!(response.authorization_url, "https://checkout.paystack.test/ref_1");

    let sent = h.gateway.requests.lock().unwrap()[0].clone();
    assert_eq!(sent.amount, 59998);
    assert_eq!(sent.callback_url, "https://knots.test/af/payment/complete");
    assert_eq!(sent.metadata.shipping_cost, Decimal::from(100));

    let order = wait_for_order(&h.system.order_client, "ref_1").await;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Decimal::new(59998, 2));
    assert!(order.items.is_empty());
}

#[tokio::test]
async fn invalid_checkout_never_reaches_the_processor() {
    let h = harness();

    let mut bad_email = init_request();
    bad_email.email = "anke@".to_string();
    let mut bad_phone = init_request();
    bad_phone.shipping_details.phone = "555-1234".to_string();
    let mut bad_amount = init_request();
    bad_amount.amount = Some(Decimal::ZERO);

    for request in [bad_email, bad_phone, bad_amount] {
        let result = h.service.initialize(request).await;
        assert!(matches!(result, Err(PaymentError::Validation(_))));
    }
    assert_eq!(h.gateway.calls(), 0);
}

#[tokio::test]
async fn unknown_user_is_rejected_before_the_processor() {
    let h = harness();
    let mut request = init_request();
    request.user_id = Some("nobody".to_string());

    let errors = match h.service.initialize(request).await {
        Err(PaymentError::Validation(errors)) => errors,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(errors[0].field, "user_id");
    assert_eq!(h.gateway.calls(), 0);
}

#[tokio::test]
async fn known_user_is_attached_to_the_pending_order() {
    let h = harness();
    let user_id = h
        .system
        .profile_client
        .create_profile(ProfileCreate {
            email: "anke@example.co.za".to_string(),
            full_name: None,
            phone: None,
        })
        .await
        .unwrap();
    let mut request = init_request();
    request.user_id = Some(user_id.clone());

    let response = h.service.initialize(request).await.unwrap();
    let order = wait_for_order(&h.system.order_client, &response.reference).await;
    assert_eq!(order.user_id, Some(user_id));
}

#[tokio::test]
async fn processor_failure_records_nothing() {
    let h = harness_with(FakeGateway::failing(401), RecordingMailer::default());

    let result = h.service.initialize(init_request()).await;
    assert!(matches!(result, Err(PaymentError::Provider { status: 401, .. })));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(h.system.order_client.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn bad_signature_changes_nothing() {
    let h = harness();
    let body = success_body("ref_x");

    let forged = signature::sign("sk_wrong", &body);
    assert!(matches!(
        h.service.handle_webhook(&body, Some(&forged)).await,
        Err(PaymentError::InvalidSignature)
    ));
    assert!(matches!(
        h.service.handle_webhook(&body, None).await,
        Err(PaymentError::InvalidSignature)
    ));
    assert!(h.system.order_client.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn webhook_without_pending_order_inserts_paid_order() {
    let h = harness();

    let outcome = deliver(&h, &success_body("ref_new")).await.unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Recorded {
            reference: "ref_new".to_string(),
            promoted: false
        }
    );

    let order = wait_for_order(&h.system.order_client, "ref_new").await;
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.subtotal, Decimal::new(49998, 2));
    assert_eq!(order.total, order.subtotal + order.shipping_cost);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].total_price, Decimal::new(49998, 2));

    wait_for_emails(&h.mailer, 1).await;
    let email = &h.mailer.sent()[0];
    assert_eq!(email.to, "anke@example.co.za");
    assert_eq!(email.subject, "Bestelling bevestig: ref_new");
}

#[tokio::test]
async fn webhook_promotes_pending_order() {
    let h = harness();
    let response = h.service.initialize(init_request()).await.unwrap();
    wait_for_order(&h.system.order_client, &response.reference).await;

    let outcome = deliver(&h, &success_body(&response.reference)).await.unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Recorded {
            reference: response.reference.clone(),
            promoted: true
        }
    );

    let order = wait_for_order(&h.system.order_client, &response.reference).await;
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.shipping_details.city, "Stellenbosch");
}

#[tokio::test]
async fn repeated_deliveries_yield_one_order_and_one_item_set() {
    let h = harness();
    let body = success_body("ref_dup");

    let (a, b, c) = tokio::join!(deliver(&h, &body), deliver(&h, &body), deliver(&h, &body));
    let outcomes = [a.unwrap(), b.unwrap(), c.unwrap()];

    let recorded = outcomes
        .iter()
        .filter(|o| matches!(o, WebhookOutcome::Recorded { .. }))
        .count();
    assert_eq!(recorded, 1);
    assert!(outcomes.iter().any(|o| matches!(
        o,
        WebhookOutcome::Duplicate { status: OrderStatus::Paid, .. }
    )));

    let orders = h.system.order_client.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].items.len(), 1);

    wait_for_emails(&h.mailer, 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.mailer.sent().len(), 1);
}

#[tokio::test]
async fn fulfilled_order_is_left_alone() {
    let h = harness();
    deliver(&h, &success_body("ref_done")).await.unwrap();
    h.system
        .order_client
        .update_status("ref_done".to_string(), OrderStatus::Shipped)
        .await
        .unwrap();

    let outcome = deliver(&h, &success_body("ref_done")).await.unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Duplicate {
            reference: "ref_done".to_string(),
            status: OrderStatus::Shipped
        }
    );
    let order = wait_for_order(&h.system.order_client, "ref_done").await;
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn non_success_events_are_acknowledged_without_writes() {
    let h = harness();
    let body = serde_json::to_vec(&json!({
        "event": "charge.failed",
        "data": {"reference": "ref_failed", "status": "failed"}
    }))
    .unwrap();

    assert_eq!(deliver(&h, &body).await.unwrap(), WebhookOutcome::Ignored);
    assert!(h.system.order_client.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_payloads_are_rejected() {
    let h = harness();

    let not_json = b"event=charge.success".to_vec();
    assert!(matches!(
        deliver(&h, &not_json).await,
        Err(PaymentError::MalformedPayload(_))
    ));

    let no_reference = serde_json::to_vec(&json!({"event": "charge.success", "data": {}})).unwrap();
    assert!(matches!(
        deliver(&h, &no_reference).await,
        Err(PaymentError::MalformedPayload(_))
    ));
}

#[tokio::test]
async fn email_failure_does_not_affect_the_order() {
    let h = harness_with(FakeGateway::default(), RecordingMailer::failing());

    let outcome = deliver(&h, &success_body("ref_mail")).await.unwrap();
    assert!(matches!(outcome, WebhookOutcome::Recorded { .. }));

    wait_for_emails(&h.mailer, 1).await;
    let order = wait_for_order(&h.system.order_client, "ref_mail").await;
    assert_eq!(order.status, OrderStatus::Paid);
}
