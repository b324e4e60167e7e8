//! End-to-end tests for the checkout page.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use reqwest::StatusCode;

use cartwheel_integration_tests::TestContext;

const ORDER_ERROR: &str = "Error placing order. Please try again later.";
const ORDER_IN_FLIGHT: &str = "Your order is already being placed.";

/// A signed-in customer with two addresses, one card and a 35.00 cart.
async fn checkout_context() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.backend.add_address(1, "1 Main St");
    ctx.backend.add_address(2, "2 Elm St");
    ctx.backend.add_payment(7, "4111 1111 1111 1234");
    ctx.backend.add_cart_item(10, "Boot", 10.0, 2);
    ctx.backend.add_cart_item(11, "Sock", 5.0, 3);
    ctx.sign_in(42).await;
    ctx
}

async fn post_text(ctx: &TestContext, path: &str, fields: &[(&str, &str)]) -> String {
    ctx.post_form(path, fields).await.text().await.unwrap()
}

async fn select_both(ctx: &TestContext) -> String {
    ctx.get_text("/checkout").await;
    post_text(ctx, "/checkout/address", &[("address_id", "1")]).await;
    post_text(ctx, "/checkout/payment", &[("payment_id", "7")]).await
}

#[tokio::test]
async fn test_checkout_requires_customer() {
    let ctx = TestContext::new().await;
    let body = ctx.get_text("/checkout").await;
    assert!(body.contains("Who is shopping?"));
}

#[tokio::test]
async fn test_checkout_shows_computed_total() {
    let ctx = checkout_context().await;
    let body = ctx.get_text("/checkout").await;

    assert!(body.contains("$35.00"));
    assert!(body.contains("No address selected"));
    assert!(body.contains("No payment method selected"));
    assert!(body.contains("disabled>Confirm &amp; Order</button>"));

    assert_eq!(ctx.backend.requests("get_address").len(), 1);
    assert_eq!(ctx.backend.requests("get_payment_option").len(), 1);
}

#[tokio::test]
async fn test_selecting_second_address_replaces_first() {
    let ctx = checkout_context().await;
    ctx.get_text("/checkout").await;
    post_text(&ctx, "/checkout/toggle/address", &[]).await;
    post_text(&ctx, "/checkout/address", &[("address_id", "1")]).await;

    let body = post_text(&ctx, "/checkout/address", &[("address_id", "2")]).await;

    assert!(body.contains("<p class=\"selected\">2 Elm St, Springfield, IL, 62701, US</p>"));
    assert_eq!(body.matches("aria-pressed=\"true\"").count(), 1);
}

#[tokio::test]
async fn test_unknown_address_is_rejected() {
    let ctx = checkout_context().await;
    ctx.get_text("/checkout").await;

    let response = ctx
        .post_form("/checkout/address", &[("address_id", "999")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_card_number_is_masked() {
    let ctx = checkout_context().await;
    ctx.get_text("/checkout").await;

    let body = post_text(&ctx, "/checkout/toggle/payment", &[]).await;

    assert!(body.contains("1234"));
    assert!(!body.contains("4111 1111 1111 1234"));
}

#[tokio::test]
async fn test_confirm_without_selection_is_noop() {
    let ctx = checkout_context().await;
    ctx.get_text("/checkout").await;
    post_text(&ctx, "/checkout/address", &[("address_id", "1")]).await;

    post_text(&ctx, "/checkout/confirm", &[]).await;

    assert!(ctx.backend.requests("add_order").is_empty());
}

#[tokio::test]
async fn test_confirm_places_order_and_clears_selection() {
    let ctx = checkout_context().await;
    let body = select_both(&ctx).await;
    assert!(body.contains("<button type=\"submit\">Confirm &amp; Order</button>"));

    let body = post_text(&ctx, "/checkout/confirm", &[]).await;
    assert!(body.contains("Order confirmed!"));

    let orders = ctx.backend.requests("add_order");
    assert_eq!(orders.len(), 1);
    let order = orders[0].json.clone().unwrap();
    assert_eq!(order["customer_id"], 42);
    assert_eq!(order["address_id"], 1);
    assert_eq!(order["payment_id"], 7);
    assert_eq!(order["total_price"].as_f64(), Some(35.0));

    let body = ctx.get_text("/checkout").await;
    assert!(body.contains("No address selected"));
    assert!(body.contains("$0.00"));
}

#[tokio::test]
async fn test_rejected_order_keeps_selection() {
    let ctx = checkout_context().await;
    ctx.backend.fail("add_order");
    select_both(&ctx).await;

    let body = post_text(&ctx, "/checkout/confirm", &[]).await;

    assert!(body.contains(ORDER_ERROR));
    assert!(body.contains("1 Main St, Springfield, IL, 62701, US"));
    assert!(body.contains("<button type=\"submit\">Confirm &amp; Order</button>"));
    assert_eq!(ctx.backend.cart_len(), 2);
    assert!(body.contains("$35.00"));
}

#[tokio::test]
async fn test_second_confirmation_while_in_flight_is_rejected() {
    let ctx = checkout_context().await;
    select_both(&ctx).await;
    ctx.backend.delay("add_order", Duration::from_millis(800));

    let first = post_text(&ctx, "/checkout/confirm", &[]);
    let second = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        post_text(&ctx, "/checkout/confirm", &[]).await
    };
    let (_, second) = tokio::join!(first, second);

    assert!(second.contains(ORDER_IN_FLIGHT));
    assert_eq!(ctx.backend.requests("add_order").len(), 1);
}

#[tokio::test]
async fn test_selection_is_locked_while_order_in_flight() {
    let ctx = checkout_context().await;
    select_both(&ctx).await;
    ctx.backend.fail("add_order");
    ctx.backend.delay("add_order", Duration::from_millis(800));

    let confirm = post_text(&ctx, "/checkout/confirm", &[]);
    let reselect = async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        post_text(&ctx, "/checkout/address", &[("address_id", "2")]).await
    };
    let (_, during) = tokio::join!(confirm, reselect);

    assert!(during.contains(ORDER_IN_FLIGHT));
    assert!(during.contains("disabled>Confirm &amp; Order</button>"));

    let body = ctx.get_text("/checkout").await;
    assert!(body.contains(ORDER_ERROR));
    assert!(body.contains("<p class=\"selected\">1 Main St, Springfield, IL, 62701, US</p>"));
    assert!(!body.contains("<p class=\"selected\">2 Elm St"));
    assert!(body.contains("<button type=\"submit\">Confirm &amp; Order</button>"));
}

#[tokio::test]
async fn test_failed_fetch_leaves_other_sections_intact() {
    let ctx = checkout_context().await;
    ctx.backend.fail("get_address");

    ctx.get_text("/checkout").await;
    let body = post_text(&ctx, "/checkout/toggle/payment", &[]).await;

    assert!(body.contains("Could not load your addresses."));
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("$35.00"));
}

#[tokio::test]
async fn test_failed_cart_fetch_shows_empty_summary() {
    let ctx = checkout_context().await;
    ctx.backend.fail("get_cart");

    let body = ctx.get_text("/checkout").await;

    assert!(body.contains("Could not load your cart."));
    assert!(body.contains("$0.00"));
    assert!(body.contains("No address selected"));
}

#[tokio::test]
async fn test_failed_payment_fetch_shows_empty_list() {
    let ctx = checkout_context().await;
    ctx.backend.fail("get_payment_option");

    ctx.get_text("/checkout").await;
    let body = post_text(&ctx, "/checkout/toggle/payment", &[]).await;

    assert!(body.contains("Could not load your payment methods."));
    assert!(body.contains("No payment options found!"));
    assert!(body.contains("$35.00"));
}

#[tokio::test]
async fn test_expanded_sections_without_entries_say_so() {
    let ctx = TestContext::new().await;
    ctx.sign_in(42).await;
    ctx.get_text("/checkout").await;

    post_text(&ctx, "/checkout/toggle/address", &[]).await;
    let body = post_text(&ctx, "/checkout/toggle/payment", &[]).await;

    assert!(body.contains("No addresses"));
    assert!(body.contains("No payment options found!"));
}

#[tokio::test]
async fn test_backend_stall_past_timeout_is_a_failed_fetch() {
    let ctx = TestContext::with_backend_timeout(1).await;
    ctx.backend.add_address(1, "1 Main St");
    ctx.backend.add_payment(7, "4111 1111 1111 1234");
    ctx.backend.add_cart_item(10, "Boot", 10.0, 2);
    ctx.sign_in(42).await;
    ctx.backend.delay("get_address", Duration::from_millis(1_500));

    let body = ctx.get_text("/checkout").await;

    assert!(body.contains("Could not load your addresses."));
    assert!(body.contains("$20.00"));
    assert_eq!(ctx.backend.requests("get_address").len(), 1);
}

#[tokio::test]
async fn test_add_address_sub_form() {
    let ctx = checkout_context().await;
    ctx.get_text("/checkout").await;
    post_text(&ctx, "/checkout/toggle/address", &[]).await;

    let body = post_text(
        &ctx,
        "/checkout/addresses",
        &[
            ("street_address", "9 Oak Ave"),
            ("city", "Springfield"),
            ("state", "IL"),
            ("postal_code", "62701"),
            ("country", "US"),
        ],
    )
    .await;

    assert!(body.contains("Address saved."));
    assert!(body.contains("9 Oak Ave"));
    let posted = ctx.backend.requests("add_address");
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].params.get("customer_id").map(String::as_str), Some("42"));
}

#[tokio::test]
async fn test_incomplete_address_is_not_sent() {
    let ctx = checkout_context().await;
    ctx.get_text("/checkout").await;

    let body = post_text(
        &ctx,
        "/checkout/addresses",
        &[
            ("street_address", "9 Oak Ave"),
            ("city", ""),
            ("state", "IL"),
            ("postal_code", "62701"),
            ("country", "US"),
        ],
    )
    .await;

    assert!(body.contains("Please fill in every address field."));
    assert!(ctx.backend.requests("add_address").is_empty());
}

#[tokio::test]
async fn test_add_payment_sub_form() {
    let ctx = checkout_context().await;
    ctx.get_text("/checkout").await;
    post_text(&ctx, "/checkout/toggle/payment", &[]).await;

    let body = post_text(
        &ctx,
        "/checkout/payments",
        &[
            ("card_number", "5500 0000 0000 0004"),
            ("card_holder_name", "Grace Hopper"),
            ("expiration_date", "01/30"),
        ],
    )
    .await;

    assert!(body.contains("Payment method saved."));
    assert!(body.contains("0004"));
    assert_eq!(ctx.backend.requests("add_payment_option").len(), 1);
}

#[tokio::test]
async fn test_returning_to_catalog_clears_selection() {
    let ctx = checkout_context().await;
    select_both(&ctx).await;

    ctx.get_text("/products").await;
    let body = ctx.get_text("/checkout").await;

    assert!(body.contains("No address selected"));
}
