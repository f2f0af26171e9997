use std::str::FromStr;

use super::*;
use crate::catalog::Category;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal")
}

fn product(id: &str, price: &str, category_id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        price: dec(price),
        category_id: Some(category_id.to_string()),
        display_color: None,
    }
}

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(
        vec![
            product("p1", "5.50", "cat-1"),
            product("p2", "4.00", "cat-2"),
            product("p3", "5.00", "cat-1"),
            product("p4", "10.00", "cat-2"),
        ],
        vec![
            Category {
                id: "cat-1".to_string(),
                name: "Coffee".to_string(),
                icon: "c".to_string(),
                display_color: "#8B4513".to_string(),
            },
            Category {
                id: "cat-2".to_string(),
                name: "Food".to_string(),
                icon: "f".to_string(),
                display_color: "#228B22".to_string(),
            },
        ],
    ))
}

fn session() -> OrderSession {
    OrderSession::new(catalog(), dec("0.15"))
}

#[test]
fn full_checkout_scenario() {
    let mut s = session();
    assert!(s.add_to_cart("p1"));
    assert!(s.add_to_cart("p1"));
    assert!(s.add_to_cart("p2"));

    assert_eq!(s.cart().lines().len(), 2);
    assert_eq!(s.cart().item_count(), 3);
    assert_eq!(s.cart().subtotal(), dec("15.00"));
    assert_eq!(s.total_due(), dec("17.25"));

    assert!(s.remove_one_from_cart("p1"));
    assert!(s.remove_one_from_cart("p1"));
    assert_eq!(s.cart().lines().len(), 1);
    assert_eq!(s.cart().lines()[0].product_id, "p2");
    assert_eq!(s.total_due(), dec("4.60"));

    assert_eq!(s.checkout().expect("checkout"), dec("4.60"));
    assert_eq!(
        s.payment_state(),
        PaymentState::AwaitingPayment { amount: dec("4.60") }
    );

    assert_eq!(s.confirm_payment().expect("confirm"), dec("4.60"));
    assert_eq!(
        s.payment_state(),
        PaymentState::Approved { amount: dec("4.60") }
    );

    let record = s
        .finish_payment()
        .expect("finish")
        .expect("approved payment yields a record");
    assert_eq!(record.total, dec("4.60"));
    assert_eq!(record.items.len(), 1);
    assert_eq!(record.items[0].product_id, "p2");
    assert_eq!(record.payment_method, PaymentMethod::Card);

    assert!(s.payment_state().is_idle());
    assert!(s.cart().is_empty());
}

#[test]
fn total_due_examples() {
    let mut s = session();
    s.add_to_cart("p4");
    assert_eq!(s.total_due(), dec("11.50"));

    let mut s = session();
    s.add_to_cart("p1");
    s.add_to_cart("p1");
    assert_eq!(s.total_due(), dec("12.65"));
}

#[test]
fn checkout_empty_cart_fails_and_stays_idle() {
    let mut s = session();
    assert_eq!(s.checkout(), Err(OrderError::EmptyCart));
    assert!(s.payment_state().is_idle());
}

#[test]
fn second_checkout_is_payment_in_progress() {
    let mut s = session();
    s.add_to_cart("p1");
    s.checkout().expect("checkout");
    assert_eq!(s.checkout(), Err(OrderError::PaymentInProgress));
}

#[test]
fn cancel_keeps_cart_untouched() {
    let mut s = session();
    s.add_to_cart("p1");
    s.add_to_cart("p3");
    let before = s.cart().clone();

    s.checkout().expect("checkout");
    s.cancel_payment().expect("cancel");
    assert_eq!(s.payment_state(), PaymentState::Cancelled);
    assert!(s.finish_payment().expect("finish").is_none());

    assert!(s.payment_state().is_idle());
    assert_eq!(s.cart(), &before);
}

#[test]
fn cart_is_locked_while_payment_on_screen() {
    let mut s = session();
    s.add_to_cart("p1");
    s.checkout().expect("checkout");

    assert!(!s.add_to_cart("p2"));
    assert!(!s.remove_one_from_cart("p1"));
    assert_eq!(s.cart().item_count(), 1);
}

#[test]
fn unknown_product_is_silently_ignored() {
    let mut s = session();
    assert!(!s.add_to_cart("ghost"));
    assert!(s.cart().is_empty());
}

#[test]
fn confirm_from_idle_is_invalid() {
    let mut s = session();
    assert!(matches!(
        s.confirm_payment(),
        Err(OrderError::InvalidTransition { from: "idle", .. })
    ));
}

#[test]
fn select_category_filters_visible_products_in_order() {
    let mut s = session();
    s.add_to_cart("p2");
    s.select_category(Some("cat-1"));

    let ids: Vec<&str> = s.visible_products().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p3"]);
    assert_eq!(s.cart().item_count(), 1, "filter must not touch the cart");

    s.select_category(Some("all"));
    assert_eq!(s.visible_products().len(), 4);
    s.select_category(None);
    assert_eq!(s.active_category(), &CategoryFilter::All);
}

#[test]
fn catalog_price_change_does_not_reprice_open_line() {
    let mut s = session();
    s.add_to_cart("p1");

    s.replace_catalog(Arc::new(Catalog::new(
        vec![product("p1", "9.00", "cat-1")],
        vec![],
    )));
    s.add_to_cart("p1");

    assert_eq!(s.cart().lines()[0].quantity, 2);
    assert_eq!(s.cart().subtotal(), dec("11.00"));
}

#[test]
fn summary_reports_units_lines_and_total() {
    let mut s = session();
    s.add_to_cart("p1");
    s.add_to_cart("p1");
    s.add_to_cart("p2");
    let summary = s.summary();
    assert_eq!(summary.item_count, 3);
    assert_eq!(summary.line_count, 2);
    assert_eq!(summary.total, dec("17.25"));
}
