//! File-backed product store tests.

use expiry_store::{Error, ExpiryWindow, NewProduct, ProductStore};
use rusqlite::Connection;
use tempfile::TempDir;
use time::macros::date;

#[test]
fn create_then_reopen_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pantry.db");

    {
        let store = ProductStore::create(&path).unwrap();
        store
            .insert(&NewProduct::new("Milk", date!(2025 - 01 - 10)).unwrap())
            .unwrap();
    }

    let store = ProductStore::open(&path).unwrap();
    let products = store.list().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Milk");
    assert_eq!(products[0].expiry_date, date!(2025 - 01 - 10));
}

#[test]
fn create_makes_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("lab").join("reagents.db");

    ProductStore::create(&path).unwrap();
    assert!(path.is_file());
}

#[test]
fn create_refuses_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pantry.db");
    std::fs::write(&path, b"not empty").unwrap();

    assert!(matches!(
        ProductStore::create(&path),
        Err(Error::AlreadyExists(_))
    ));
    assert_eq!(std::fs::read(&path).unwrap(), b"not empty");
}

#[test]
fn open_missing_file_does_not_create_it() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.db");

    assert!(matches!(
        ProductStore::open_read_only(&path),
        Err(Error::StoreNotFound(_))
    ));
    assert!(matches!(ProductStore::open(&path), Err(Error::StoreNotFound(_))));
    assert!(!path.exists());
}

#[test]
fn open_rejects_database_without_products_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("other.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE notes (body TEXT);").unwrap();
    drop(conn);

    assert!(matches!(
        ProductStore::open_read_only(&path),
        Err(Error::MissingProductsTable(_))
    ));
}

#[test]
fn open_rejects_non_sqlite_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.db");
    std::fs::write(&path, b"this is definitely not a sqlite database file").unwrap();

    assert!(ProductStore::open_read_only(&path).is_err());
}

#[test]
fn read_only_store_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pantry.db");
    ProductStore::create(&path).unwrap();

    let store = ProductStore::open_read_only(&path).unwrap();
    let result = store.insert(&NewProduct::new("Milk", date!(2025 - 01 - 10)).unwrap());
    assert!(matches!(result, Err(Error::Database(_))));
}

#[test]
fn reads_stores_written_by_hand() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE products (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         name TEXT NOT NULL, expiry_date DATE NOT NULL);
         INSERT INTO products (name, expiry_date) VALUES ('Buffer', '2025-01-04');
         INSERT INTO products (name, expiry_date) VALUES ('Enzyme', '2025-01-15');",
    )
    .unwrap();
    drop(conn);

    let store = ProductStore::open_read_only(&path).unwrap();
    let window = ExpiryWindow::new(date!(2025 - 01 - 05), 14);
    assert_eq!(store.upcoming(&window).unwrap()[0].name, "Enzyme");
    assert_eq!(store.expired(&window).unwrap()[0].name, "Buffer");
}
