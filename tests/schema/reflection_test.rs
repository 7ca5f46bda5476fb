//! Schema reflection against the seeded SQLite blog database.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use autocrud::cache::{MemoryCache, SchemaCache};
use autocrud::schema::{
    parse_virtual_tables, CanonicalType, ReflectionService, SchemaReflector, TableKind,
};
use autocrud::Error;

use common::blog;

#[tokio::test]
async fn test_reflects_all_tables_sorted() {
    let blog = blog().await;
    let names = blog.reflection.table_names().await.unwrap();
    assert_eq!(
        names,
        vec!["categories", "comments", "post_tags", "posts", "products", "tags", "users"]
    );
}

#[tokio::test]
async fn test_reflects_columns_and_keys() {
    let blog = blog().await;
    let posts = blog.reflection.table("posts").await.unwrap().unwrap();

    assert_eq!(posts.kind(), TableKind::Table);
    assert_eq!(
        posts.column_names(),
        vec!["id", "user_id", "category_id", "content"]
    );
    assert_eq!(posts.pk().map(|c| c.name.as_str()), Some("id"));
    assert_eq!(posts.fks().get("user_id").map(String::as_str), Some("users"));
    assert_eq!(
        posts.fks().get("category_id").map(String::as_str),
        Some("categories")
    );

    let content = posts.column("content").unwrap();
    assert_eq!(content.kind, CanonicalType::Varchar);
    assert_eq!(content.length, 255);
    assert!(!content.nullable);
    assert!(!content.pk);
}

#[tokio::test]
async fn test_reflects_sizes_and_types() {
    let blog = blog().await;
    let products = blog.reflection.table("products").await.unwrap().unwrap();

    let price = products.column("price").unwrap();
    assert_eq!(price.kind, CanonicalType::Decimal);
    assert_eq!((price.precision, price.scale), (10, 2));
    assert_eq!(price.size().as_deref(), Some("10,2"));

    assert_eq!(products.column("visits").unwrap().kind, CanonicalType::Integer);
    assert!(products.column("visits").unwrap().nullable);
    assert_eq!(products.column("in_stock").unwrap().kind, CanonicalType::Boolean);

    let categories = blog.reflection.table("categories").await.unwrap().unwrap();
    let icon = categories.column("icon").unwrap();
    assert_eq!(icon.kind, CanonicalType::Blob);
    assert!(icon.nullable);
}

#[tokio::test]
async fn test_detects_junction_tables() {
    let blog = blog().await;
    let db = blog.reflection.database().await.unwrap();

    let junction = db.junction_between("posts", "tags").unwrap();
    assert_eq!(junction.name(), "post_tags");
    assert!(db.junction_between("posts", "categories").is_none());

    let comments = db.table("comments").unwrap();
    let fks: Vec<&str> = comments.fks_to("posts").iter().map(|c| c.name.as_str()).collect();
    assert_eq!(fks, vec!["post_id"]);
}

#[tokio::test]
async fn test_whitelist_limits_tables() {
    let blog = blog().await;
    let reflector = SchemaReflector::new(blog.db.clone(), "main")
        .with_whitelist(vec!["posts".to_string(), "tags".to_string()]);
    let db = reflector.reflect().await.unwrap();
    assert_eq!(db.table_names(), vec!["posts", "tags"]);
}

#[tokio::test]
async fn test_views_have_no_keys() {
    let blog = blog().await;
    blog.executor
        .execute_batch("CREATE VIEW post_summaries AS SELECT id, content FROM posts;")
        .await
        .unwrap();
    let db = blog.reflection.refresh().await.unwrap();

    let view = db.table("post_summaries").unwrap();
    assert_eq!(view.kind(), TableKind::View);
    assert!(view.pk().is_none());
    assert!(view.fks().is_empty());
    assert_eq!(view.column_names(), vec!["id", "content"]);
}

#[tokio::test]
async fn test_snapshot_is_kept_until_refresh() {
    let blog = blog().await;
    assert!(!blog.reflection.has_table("audit").await.unwrap());

    blog.executor
        .execute_batch("CREATE TABLE audit (id INTEGER PRIMARY KEY, note TEXT);")
        .await
        .unwrap();
    assert!(!blog.reflection.has_table("audit").await.unwrap());

    blog.reflection.refresh().await.unwrap();
    let audit = blog.reflection.table("audit").await.unwrap().unwrap();
    assert_eq!(audit.column("note").unwrap().kind, CanonicalType::Clob);
}

#[tokio::test]
async fn test_remove_table_from_snapshot() {
    let blog = blog().await;
    assert!(blog.reflection.remove_table("users").await.unwrap());
    assert!(!blog.reflection.has_table("users").await.unwrap());
    assert!(!blog.reflection.remove_table("users").await.unwrap());
}

#[tokio::test]
async fn test_virtual_tables_are_merged() {
    let blog = blog().await;
    let virtual_tables = parse_virtual_tables(
        r#"[{
            "name": "post_stats",
            "type": "view",
            "columns": [
                {"name": "post_id", "type": "integer", "pk": true, "fk": "posts"},
                {"name": "comment_count", "type": "bigint", "nullable": true}
            ]
        }]"#,
    )
    .unwrap();
    let reflector = SchemaReflector::new(blog.db.clone(), "main");
    let service = ReflectionService::new(reflector, Duration::ZERO).with_virtual_tables(virtual_tables);

    let stats = service.table("post_stats").await.unwrap().unwrap();
    assert_eq!(stats.kind(), TableKind::View);
    assert_eq!(stats.pk().map(|c| c.name.as_str()), Some("post_id"));
    assert_eq!(stats.fks_to("posts").len(), 1);
    assert!(service.has_table("posts").await.unwrap());
}

#[test]
fn test_malformed_virtual_tables_are_rejected() {
    let err = parse_virtual_tables(r#"{"name": "oops"}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_persisted_snapshot_is_shared_through_cache() {
    let blog = blog().await;
    let cache: Arc<dyn SchemaCache> = Arc::new(MemoryCache::new());

    let first = ReflectionService::new(
        SchemaReflector::new(blog.db.clone(), "main"),
        Duration::from_secs(60),
    )
    .with_cache(Arc::clone(&cache), "blog");
    assert_eq!(first.table_names().await.unwrap().len(), 7);
    assert!(cache.get("blog").unwrap().is_some());

    blog.executor
        .execute_batch("CREATE TABLE audit (id INTEGER PRIMARY KEY);")
        .await
        .unwrap();

    // A new service starts from the persisted snapshot.
    let second = ReflectionService::new(
        SchemaReflector::new(blog.db.clone(), "main"),
        Duration::from_secs(60),
    )
    .with_cache(Arc::clone(&cache), "blog");
    assert!(!second.has_table("audit").await.unwrap());

    second.refresh().await.unwrap();
    assert!(second.has_table("audit").await.unwrap());
}

#[tokio::test]
async fn test_zero_ttl_never_persists() {
    let blog = blog().await;
    let cache: Arc<dyn SchemaCache> = Arc::new(MemoryCache::new());
    let service = ReflectionService::new(
        SchemaReflector::new(blog.db.clone(), "main"),
        Duration::ZERO,
    )
    .with_cache(Arc::clone(&cache), "blog");

    service.database().await.unwrap();
    assert!(cache.get("blog").unwrap().is_none());
}
