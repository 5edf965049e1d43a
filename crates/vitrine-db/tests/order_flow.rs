//! End-to-end order lifecycle tests against in-memory SQLite.

use std::sync::Arc;

use vitrine_core::catalog::ProductDraft;
use vitrine_core::ids::{OrderId, ProductId};
use vitrine_core::money::Money;
use vitrine_core::orders::{OrderDraft, OrderItemDraft, OrderPatch, OrderStatus};
use vitrine_core::StoreError;
use vitrine_db::{schema, ConnectionPool, OrderStore, ProductStore};

fn setup() -> (ProductStore, OrderStore) {
    let pool = Arc::new(ConnectionPool::open_in_memory().unwrap());
    schema::init(&pool).unwrap();
    (ProductStore::new(pool.clone()), OrderStore::new(pool))
}

fn product(products: &ProductStore, name: &str, slug: &str, price: f64, stock: i64) -> ProductId {
    products
        .insert(ProductDraft {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            price: Money::from_decimal(price),
            stock,
            category_id: None,
            sizes: vec!["M".to_string(), "L".to_string()],
            image_url: Some(format!("https://cdn.example.com/{}.jpg", slug)),
            is_new_drop: false,
            is_featured: false,
        })
        .unwrap()
        .id
}

fn item(product_id: &ProductId, quantity: i64, price: f64) -> OrderItemDraft {
    OrderItemDraft {
        product_id: product_id.clone(),
        size: Some("M".to_string()),
        quantity,
        price: Money::from_decimal(price),
    }
}

fn draft(items: Vec<OrderItemDraft>) -> OrderDraft {
    OrderDraft {
        customer_name: "Nadia Bennis".to_string(),
        customer_phone: "0612345678".to_string(),
        customer_email: Some("nadia@example.com".to_string()),
        notes: None,
        items,
    }
}

#[test]
fn create_computes_total_and_round_trips() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 100.0, 10);
    let b = product(&products, "Cap", "cap", 50.0, 10);

    // [{price: 100.00, qty: 2}, {price: 50.00, qty: 1}] -> 250.00
    let (order, items) = orders
        .create(&draft(vec![item(&a, 2, 100.0), item(&b, 1, 50.0)]))
        .unwrap();

    assert_eq!(order.total.cents, 25000);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].subtotal.cents, 20000);
    assert_eq!(items[0].name, "Tee");

    let (fetched, fetched_items) = orders.get(&order.id).unwrap();
    assert_eq!(fetched, order);
    assert_eq!(fetched_items, items);
}

#[test]
fn create_snapshots_product_fields() {
    let (products, orders) = setup();
    let a = product(&products, "Original Name", "snap", 80.0, 5);
    let (order, _) = orders.create(&draft(vec![item(&a, 1, 80.0)])).unwrap();

    // Later catalog edits must not leak into the stored line item.
    products
        .update(
            &a,
            vitrine_core::catalog::ProductPatch {
                name: Some("Renamed".to_string()),
                price: Some(Money::from_decimal(120.0)),
                ..Default::default()
            },
        )
        .unwrap();

    let (_, items) = orders.get(&order.id).unwrap();
    assert_eq!(items[0].name, "Original Name");
    assert_eq!(items[0].unit_price.cents, 8000);
}

#[test]
fn create_rejects_bad_input() {
    let (_, orders) = setup();
    let mut bad = draft(vec![]);
    bad.customer_name = "N".to_string();
    match orders.create(&bad) {
        Err(StoreError::Validation(errors)) => assert!(errors.len() >= 2),
        other => panic!("expected validation error, got {:?}", other.err()),
    }
}

#[test]
fn create_with_unknown_product_persists_nothing() {
    let (_, orders) = setup();
    let ghost = ProductId::new("ghost");
    match orders.create(&draft(vec![item(&ghost, 1, 10.0)])) {
        Err(StoreError::ProductNotFound(_)) => {}
        other => panic!("expected product not found, got {:?}", other.err()),
    }
    assert!(orders.list().unwrap().is_empty());
}

#[test]
fn validate_insufficient_stock_changes_nothing() {
    let (products, orders) = setup();
    let a = product(&products, "Limited", "limited", 100.0, 3);
    let (order, _) = orders.create(&draft(vec![item(&a, 5, 100.0)])).unwrap();

    match orders.validate(&order.id) {
        Err(StoreError::InsufficientStock {
            name,
            requested,
            available,
            ..
        }) => {
            assert_eq!(name, "Limited");
            assert_eq!(requested, 5);
            assert_eq!(available, 3);
        }
        other => panic!("expected insufficient stock, got {:?}", other.err()),
    }

    assert_eq!(products.get(&a).unwrap().stock, 3);
    let (fetched, _) = orders.get(&order.id).unwrap();
    assert_eq!(fetched.status, OrderStatus::Pending);
}

#[test]
fn validate_decrements_and_completes() {
    let (products, orders) = setup();
    let b = product(&products, "Hoodie", "hoodie", 90.0, 10);
    let (order, _) = orders.create(&draft(vec![item(&b, 4, 90.0)])).unwrap();

    let validated = orders.validate(&order.id).unwrap();
    assert_eq!(validated.status, OrderStatus::Completed);
    assert!(validated.validated_at.is_some());
    assert_eq!(products.get(&b).unwrap().stock, 6);
}

#[test]
fn validate_is_all_or_nothing_across_items() {
    let (products, orders) = setup();
    let plenty = product(&products, "Plenty", "plenty", 10.0, 100);
    let scarce = product(&products, "Scarce", "scarce", 20.0, 1);
    let (order, _) = orders
        .create(&draft(vec![item(&plenty, 5, 10.0), item(&scarce, 2, 20.0)]))
        .unwrap();

    assert!(matches!(
        orders.validate(&order.id),
        Err(StoreError::InsufficientStock { .. })
    ));

    // The first item's decrement was rolled back with the rest.
    assert_eq!(products.get(&plenty).unwrap().stock, 100);
    assert_eq!(products.get(&scarce).unwrap().stock, 1);
}

#[test]
fn validate_rejects_non_pending_orders() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 50.0, 10);
    let (order, _) = orders.create(&draft(vec![item(&a, 1, 50.0)])).unwrap();

    orders.validate(&order.id).unwrap();
    match orders.validate(&order.id) {
        Err(StoreError::InvalidState(msg)) => assert!(msg.contains("pending")),
        other => panic!("expected invalid state, got {:?}", other.err()),
    }
    // Exactly one decrement happened.
    assert_eq!(products.get(&a).unwrap().stock, 9);
}

#[test]
fn validate_missing_order_is_not_found() {
    let (_, orders) = setup();
    assert!(matches!(
        orders.validate(&OrderId::new("nope")),
        Err(StoreError::OrderNotFound(_))
    ));
}

#[test]
fn cancel_pending_then_validate_rejected() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 50.0, 10);
    let (order, _) = orders.create(&draft(vec![item(&a, 2, 50.0)])).unwrap();

    let cancelled = orders.cancel(&order.id).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    // No stock was taken, none is restored.
    assert_eq!(products.get(&a).unwrap().stock, 10);

    assert!(matches!(
        orders.validate(&order.id),
        Err(StoreError::InvalidState(_))
    ));
}

#[test]
fn cancel_completed_rejected_and_recancel_allowed() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 50.0, 10);

    let (done, _) = orders.create(&draft(vec![item(&a, 1, 50.0)])).unwrap();
    orders.validate(&done.id).unwrap();
    match orders.cancel(&done.id) {
        Err(StoreError::InvalidState(msg)) => assert!(msg.contains("completed")),
        other => panic!("expected invalid state, got {:?}", other.err()),
    }

    let (gone, _) = orders.create(&draft(vec![item(&a, 1, 50.0)])).unwrap();
    orders.cancel(&gone.id).unwrap();
    // Re-cancelling is a permitted repeat of the same update.
    let again = orders.cancel(&gone.id).unwrap();
    assert_eq!(again.status, OrderStatus::Cancelled);
}

#[test]
fn update_replaces_items_and_recomputes_total() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 50.0, 10);
    let b = product(&products, "Cap", "cap", 30.0, 10);
    let (order, _) = orders.create(&draft(vec![item(&a, 2, 50.0)])).unwrap();

    let updated = orders
        .update(
            &order.id,
            OrderPatch {
                items: Some(vec![item(&b, 3, 30.0)]),
                // Ignored: the new item set wins.
                total: Some(Money::from_decimal(1.0)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.total.cents, 9000);

    let (_, items) = orders.get(&order.id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, b);
    assert_eq!(items[0].subtotal.cents, 9000);
}

#[test]
fn update_total_override_is_caller_trusted() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 50.0, 10);
    let (order, _) = orders.create(&draft(vec![item(&a, 2, 50.0)])).unwrap();

    let updated = orders
        .update(
            &order.id,
            OrderPatch {
                total: Some(Money::from_decimal(42.0)),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.total.cents, 4200);
}

#[test]
fn update_rejects_non_pending_orders() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 50.0, 10);
    let (order, _) = orders.create(&draft(vec![item(&a, 1, 50.0)])).unwrap();
    orders.validate(&order.id).unwrap();

    match orders.update(
        &order.id,
        OrderPatch {
            notes: Some("late note".to_string()),
            ..Default::default()
        },
    ) {
        Err(StoreError::InvalidState(msg)) => assert!(msg.contains("pending")),
        other => panic!("expected invalid state, got {:?}", other.err()),
    }
}

#[test]
fn stats_aggregate_completed_sales() {
    let (products, orders) = setup();
    let a = product(&products, "Tee", "tee", 100.0, 100);

    let (first, _) = orders.create(&draft(vec![item(&a, 1, 100.0)])).unwrap();
    let (second, _) = orders.create(&draft(vec![item(&a, 2, 100.0)])).unwrap();
    let (third, _) = orders.create(&draft(vec![item(&a, 3, 100.0)])).unwrap();

    orders.validate(&first.id).unwrap();
    orders.validate(&second.id).unwrap();
    orders.cancel(&third.id).unwrap();
    orders.create(&draft(vec![item(&a, 1, 100.0)])).unwrap();

    let stats = orders.stats().unwrap();
    assert_eq!(stats.total_sales.cents, 30000);
    assert_eq!(stats.orders_by_status.completed, 2);
    assert_eq!(stats.orders_by_status.cancelled, 1);
    assert_eq!(stats.orders_by_status.pending, 1);
}

#[test]
fn concurrent_validation_completes_exactly_once() {
    let (products, orders) = setup();
    let a = product(&products, "Drop", "drop", 100.0, 5);
    let (order, _) = orders.create(&draft(vec![item(&a, 5, 100.0)])).unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let orders = orders.clone();
        let id = order.id.clone();
        handles.push(std::thread::spawn(move || orders.validate(&id)));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one validation may succeed");
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, StoreError::InvalidState(_))));

    // One decrement pass, not two.
    assert_eq!(products.get(&a).unwrap().stock, 0);
}

#[test]
fn concurrent_orders_cannot_overdraw_shared_stock() {
    let (products, orders) = setup();
    let a = product(&products, "Drop", "drop", 100.0, 6);

    // Two orders for 4 units each against 6 in stock: one must lose.
    let (first, _) = orders.create(&draft(vec![item(&a, 4, 100.0)])).unwrap();
    let (second, _) = orders.create(&draft(vec![item(&a, 4, 100.0)])).unwrap();

    let mut handles = Vec::new();
    for id in [first.id.clone(), second.id.clone()] {
        let orders = orders.clone();
        handles.push(std::thread::spawn(move || orders.validate(&id)));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, StoreError::InsufficientStock { .. })));

    let stock = products.get(&a).unwrap().stock;
    assert_eq!(stock, 2, "stock must never go negative or double-decrement");
}
