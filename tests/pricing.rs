use axum_bookstore_api::dto::orders::OrderItemInput;
use axum_bookstore_api::error::AppError;
use axum_bookstore_api::services::order_service::{order_total, parse_order_items, validate_items};
use rust_decimal::Decimal;

fn item(name: &str, quantity: i32, unit_price: Decimal) -> OrderItemInput {
    OrderItemInput {
        product_name: name.to_string(),
        quantity,
        unit_price,
    }
}

#[test]
fn subtotal_is_quantity_times_unit_price() {
    let it = item("Widget", 2, Decimal::new(550, 2));
    assert_eq!(it.subtotal(), Decimal::new(1100, 2));
}

#[test]
fn total_is_sum_of_subtotals() {
    let items = vec![
        item("A", 2, Decimal::new(50, 1)),
        item("B", 1, Decimal::new(30, 1)),
    ];
    assert_eq!(order_total(&items), Decimal::new(130, 1));
}

#[test]
fn empty_order_totals_zero() {
    assert_eq!(order_total(&[]), Decimal::ZERO);
}

#[test]
fn parses_camel_case_payload() {
    let payload = r#"[{"productName":"A","quantity":2,"unitPrice":5.0},{"productName":"B","quantity":1,"unitPrice":3.0}]"#;
    let items = parse_order_items(Some(payload)).expect("payload parses");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_name, "A");
    assert_eq!(items[0].quantity, 2);
    assert_eq!(order_total(&items), Decimal::new(130, 1));
}

#[test]
fn blank_payload_is_an_empty_order() {
    assert!(parse_order_items(None).unwrap().is_empty());
    assert!(parse_order_items(Some("")).unwrap().is_empty());
    assert!(parse_order_items(Some("   ")).unwrap().is_empty());
}

#[test]
fn malformed_payload_is_a_validation_failure() {
    let err = parse_order_items(Some("{not json")).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Valid JSON of the wrong shape fails the same way.
    let err = parse_order_items(Some(r#"{"productName":"A"}"#)).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn item_bounds_are_enforced() {
    let zero_quantity = vec![item("A", 0, Decimal::new(50, 1))];
    assert!(matches!(
        validate_items(&zero_quantity),
        Err(AppError::Validation(_))
    ));

    let free_item = vec![item("A", 1, Decimal::ZERO)];
    assert!(matches!(
        validate_items(&free_item),
        Err(AppError::Validation(_))
    ));

    let nameless = vec![item("", 1, Decimal::new(50, 1))];
    assert!(matches!(
        validate_items(&nameless),
        Err(AppError::Validation(_))
    ));

    let fine = vec![item("A", 1, Decimal::new(50, 1))];
    assert!(validate_items(&fine).is_ok());
}
