//! Integration tests for the store implementations.
//!
//! Every store must honor the same contract, so the contract checks are
//! written once as generic helpers and run against each implementation.

use latchkey_store::{
    FileStore, MemoryStore, PlatformStore, SessionStore, StorageKey,
};

// =========================================================================
// Shared contract
// =========================================================================

async fn check_contract<S: SessionStore>(store: &S) {
    let phone = StorageKey::UserPhone.as_str();
    let data = StorageKey::UserData.as_str();

    // Never written → absent.
    assert_eq!(store.read(phone).await.unwrap(), None);

    // Write then read.
    store.write(phone, Some("+911111111111")).await.unwrap();
    assert_eq!(
        store.read(phone).await.unwrap().as_deref(),
        Some("+911111111111")
    );

    // Keys are independent.
    store.set(data, "{\"id\":\"1\"}").await.unwrap();
    store.erase(data).await.unwrap();
    assert_eq!(store.read(data).await.unwrap(), None);
    assert_eq!(
        store.read(phone).await.unwrap().as_deref(),
        Some("+911111111111")
    );

    // Writing `None` erases, twice is still fine.
    store.write(phone, None).await.unwrap();
    store.write(phone, None).await.unwrap();
    assert_eq!(store.read(phone).await.unwrap(), None);
}

#[tokio::test]
async fn test_memory_store_honors_contract() {
    check_contract(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_file_store_honors_contract() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileStore::open(tmp.path()).await.unwrap();
    check_contract(&store).await;
}

#[tokio::test]
async fn test_platform_store_honors_contract() {
    let tmp = tempfile::tempdir().unwrap();
    let store = PlatformStore::open(tmp.path()).await;
    check_contract(&store).await;
}

// =========================================================================
// Durability
// =========================================================================

#[tokio::test]
async fn test_file_store_values_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let key = StorageKey::SessionToken.as_str();

    {
        let store = FileStore::open(tmp.path()).await.unwrap();
        store.set(key, "tok_1_abc").await.unwrap();
    }

    // A fresh handle over the same directory = an app restart.
    let reopened = FileStore::open(tmp.path()).await.unwrap();
    assert_eq!(
        reopened.read(key).await.unwrap().as_deref(),
        Some("tok_1_abc")
    );
}

#[tokio::test]
async fn test_file_store_preserves_value_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileStore::open(tmp.path()).await.unwrap();
    let value = "  multi\nline {\"json\": true}\n";

    store.set("user_data", value).await.unwrap();

    assert_eq!(store.read("user_data").await.unwrap().as_deref(), Some(value));
}

#[tokio::test]
async fn test_platform_store_secure_values_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();

    {
        let store = PlatformStore::open(tmp.path()).await;
        assert!(store.is_secure());
        store.set("user_phone", "+911111111111").await.unwrap();
    }

    let reopened = PlatformStore::open(tmp.path()).await;
    assert_eq!(
        reopened.read("user_phone").await.unwrap().as_deref(),
        Some("+911111111111")
    );
}
