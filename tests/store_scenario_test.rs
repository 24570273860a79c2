use expense_tracker::{Config, Decimal, ExpenseStore, NewExpense};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn dec(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn setup_store() -> (ExpenseStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("expenses.db")
        .to_string_lossy()
        .to_string();
    (ExpenseStore::new(Config::with_database_path(db_path)), temp_dir)
}

async fn seed(store: &ExpenseStore) {
    for (name, amount, category, date) in [
        ("Coffee", "4.50", "Food", "2024-01-05"),
        ("Bus", "2.00", "Transport", "2024-01-06"),
        ("Lunch", "12.00", "Food", "2024-01-07"),
    ] {
        store
            .add_expense(&NewExpense::new(name, dec(amount), category, date))
            .await
            .expect("insert failed");
    }
}

#[tokio::test]
async fn test_coffee_bus_lunch_scenario() {
    let (store, _temp) = setup_store();
    store.initialize().await.expect("initialize failed");
    seed(&store).await;

    assert_eq!(store.get_total_expenses().await.unwrap(), dec("18.50"));

    let mut expected = BTreeMap::new();
    expected.insert("Food".to_string(), dec("16.50"));
    expected.insert("Transport".to_string(), dec("2.00"));
    assert_eq!(store.get_expenses_by_category().await.unwrap(), expected);

    let expenses = store.get_expenses().await.unwrap();
    let names: Vec<&str> = expenses.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Lunch", "Bus", "Coffee"]);

    let bus = expenses
        .iter()
        .find(|e| e.name == "Bus")
        .and_then(|e| e.id)
        .expect("bus has an id");
    store.delete_expense(bus).await.unwrap();

    assert_eq!(store.get_total_expenses().await.unwrap(), dec("16.50"));
    let mut expected = BTreeMap::new();
    expected.insert("Food".to_string(), dec("16.50"));
    assert_eq!(store.get_expenses_by_category().await.unwrap(), expected);
}

#[tokio::test]
async fn test_add_then_list_contains_exactly_one_new_entry() {
    let (store, _temp) = setup_store();
    seed(&store).await;
    let before = store.get_expenses().await.unwrap();

    let draft = NewExpense::new("Book", dec("15.25"), "Loisirs", "2024-01-06T12:00:00.000Z");
    let id = store.add_expense(&draft).await.unwrap();

    let after = store.get_expenses().await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert!(before.iter().all(|e| e.id != Some(id)));

    let matching: Vec<_> = after.iter().filter(|e| e.id == Some(id)).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(*matching[0], draft.into_expense(id));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (store, _temp) = setup_store();
    seed(&store).await;
    let id = store.get_expenses().await.unwrap()[0].id.unwrap();

    store.delete_expense(id).await.unwrap();
    store.delete_expense(id).await.unwrap();

    let remaining = store.get_expenses().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|e| e.id != Some(id)));
}

#[tokio::test]
async fn test_empty_store_aggregates() {
    let (store, _temp) = setup_store();
    assert!(store.get_expenses().await.unwrap().is_empty());
    assert!(store.get_expenses_by_category().await.unwrap().is_empty());
    assert_eq!(store.get_total_expenses().await.unwrap(), Decimal::zero());
}

#[tokio::test]
async fn test_totals_stay_consistent_across_inserts_and_deletes() {
    let (store, _temp) = setup_store();
    let categories = ["Food", "Transport", "food", "Santé"];

    for step in 0..40i64 {
        let category = categories[(step as usize * 7) % categories.len()];
        let amount = Decimal::from_str_canonical(&format!("{}.{}", step % 13, (step * 25) % 100))
            .unwrap();
        let date = format!("2024-{:02}-{:02}", step % 12 + 1, step % 28 + 1);
        let id = store
            .add_expense(&NewExpense::new(format!("item {}", step), amount, category, date))
            .await
            .unwrap();

        if step % 3 == 0 {
            store.delete_expense(id).await.unwrap();
        }

        let expenses = store.get_expenses().await.unwrap();
        let total = store.get_total_expenses().await.unwrap();
        let by_category = store.get_expenses_by_category().await.unwrap();

        let listed_sum: Decimal = expenses.iter().map(|e| e.amount).sum();
        assert_eq!(total, listed_sum, "total mismatch at step {}", step);

        let grouped_sum: Decimal = by_category.values().sum();
        assert_eq!(grouped_sum, total, "partition mismatch at step {}", step);

        for (category, sum) in &by_category {
            let expected: Decimal = expenses
                .iter()
                .filter(|e| &e.category == category)
                .map(|e| e.amount)
                .sum();
            assert_eq!(*sum, expected);
        }

        assert!(
            expenses.windows(2).all(|w| w[0].date >= w[1].date),
            "not sorted by date descending at step {}",
            step
        );
    }
}

#[tokio::test]
async fn test_each_mutation_notifies_every_subscriber_once() {
    let (store, _temp) = setup_store();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first);
    let sub_a = store.notifier().subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&second);
    let _sub_b = store.notifier().subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let id = store
        .add_expense(&NewExpense::new("Coffee", dec("4.5"), "Food", "2024-01-05"))
        .await
        .unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);

    sub_a.unsubscribe();
    store.delete_expense(id).await.unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 2);
}
