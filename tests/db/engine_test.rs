//! GenericDb against the seeded SQLite blog database.

#[path = "../common/mod.rs"]
mod common;

use serde_json::json;

use autocrud::db::RequestContext;
use autocrud::record::Condition;
use autocrud::schema::ReflectedTable;
use autocrud::sql::{OrderByExpr, Statement};
use autocrud::Error;

use common::{blog, row, Blog};

async fn table(blog: &Blog, name: &str) -> ReflectedTable {
    blog.reflection.table(name).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_read_converts_output_types() {
    let blog = blog().await;
    let products = table(&blog, "products").await;
    let ctx = RequestContext::new();

    let product = blog.db.read_one(&ctx, &products, &[], "1").await.unwrap().unwrap();
    assert_eq!(
        serde_json::Value::Object(product),
        json!({"id": 1, "name": "Product 1", "price": "1.50", "visits": 0, "in_stock": true})
    );

    let product = blog.db.read_one(&ctx, &products, &[], "11").await.unwrap().unwrap();
    assert_eq!(product["price"], json!("11.50"));
    assert_eq!(product["in_stock"], json!(false));

    assert!(blog.db.read_one(&ctx, &products, &[], "99").await.unwrap().is_none());
}

#[tokio::test]
async fn test_read_selected_columns_only() {
    let blog = blog().await;
    let posts = table(&blog, "posts").await;
    let columns = vec!["content".to_string(), "nope".to_string(), "id".to_string()];

    let post = blog
        .db
        .read_one(&RequestContext::new(), &posts, &columns, "2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(serde_json::Value::Object(post), json!({"content": "It works!", "id": 2}));
}

#[tokio::test]
async fn test_create_returns_new_key() {
    let blog = blog().await;
    let posts = table(&blog, "posts").await;
    let ctx = RequestContext::new();

    let record = row(json!({"user_id": 1, "category_id": 1, "content": "third", "ignored": true}));
    let key = blog.db.create(&ctx, &posts, &record).await.unwrap();
    assert_eq!(key, json!(3));

    let created = blog.db.read_one(&ctx, &posts, &[], "3").await.unwrap().unwrap();
    assert_eq!(created["content"], json!("third"));
}

#[tokio::test]
async fn test_create_violating_foreign_key() {
    let blog = blog().await;
    let posts = table(&blog, "posts").await;
    let record = row(json!({"user_id": 99, "category_id": 1, "content": "orphan"}));

    let err = blog
        .db
        .create(&RequestContext::new(), &posts, &record)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DataIntegrityViolation(_)), "{:?}", err);
}

#[tokio::test]
async fn test_create_duplicate_unique_value() {
    let blog = blog().await;
    let users = table(&blog, "users").await;
    let record = row(json!({"username": "user1", "password": "x"}));

    let err = blog
        .db
        .create(&RequestContext::new(), &users, &record)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey(_)), "{:?}", err);
}

#[tokio::test]
async fn test_binary_round_trip_from_base64url() {
    let blog = blog().await;
    let categories = table(&blog, "categories").await;
    let ctx = RequestContext::new();

    let updated = blog
        .db
        .update(&ctx, &categories, "1", &row(json!({"icon": "AAH_"})))
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let category = blog.db.read_one(&ctx, &categories, &[], "1").await.unwrap().unwrap();
    assert_eq!(category["icon"], json!("AAH/"));
}

#[tokio::test]
async fn test_binary_input_is_stored_as_blob() {
    let blog = blog().await;
    let categories = table(&blog, "categories").await;
    let ctx = RequestContext::new();

    blog.db
        .execute(&Statement::new(
            "UPDATE categories SET icon = X'0001FF' WHERE id = 2",
            vec![],
        ))
        .await
        .unwrap();
    blog.db
        .update(&ctx, &categories, "1", &row(json!({"icon": "AAH_"})))
        .await
        .unwrap();

    let raw = blog
        .db
        .query(&Statement::new(
            "SELECT id, typeof(icon) AS kind, length(icon) AS size FROM categories ORDER BY id",
            vec![],
        ))
        .await
        .unwrap();
    let raw: Vec<_> = raw.into_iter().map(serde_json::Value::Object).collect();
    assert_eq!(
        raw,
        vec![
            json!({"id": 1, "kind": "blob", "size": 3}),
            json!({"id": 2, "kind": "blob", "size": 3}),
        ]
    );

    let same_icon = Condition::from_filter(&categories, "icon,eq,AAH/");
    assert_eq!(blog.db.count(&ctx, &categories, &same_icon).await.unwrap(), 2);
}

#[tokio::test]
async fn test_binary_input_must_be_base64() {
    let blog = blog().await;
    let categories = table(&blog, "categories").await;

    let err = blog
        .db
        .update(&RequestContext::new(), &categories, "1", &row(json!({"icon": "not base64!"})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{:?}", err);
}

#[tokio::test]
async fn test_boolean_input_is_stored_as_integer() {
    let blog = blog().await;
    let tags = table(&blog, "tags").await;
    let ctx = RequestContext::new();

    blog.db
        .update(&ctx, &tags, "1", &row(json!({"is_important": true})))
        .await
        .unwrap();
    let raw = blog
        .db
        .query(&Statement::new(
            "SELECT is_important FROM tags WHERE id = 1",
            vec![],
        ))
        .await
        .unwrap();
    assert_eq!(raw[0]["is_important"], json!(1));

    let tag = blog.db.read_one(&ctx, &tags, &[], "1").await.unwrap().unwrap();
    assert_eq!(tag["is_important"], json!(true));
}

#[tokio::test]
async fn test_increment_adds_deltas() {
    let blog = blog().await;
    let products = table(&blog, "products").await;
    let ctx = RequestContext::new();

    let affected = blog
        .db
        .increment(&ctx, &products, "3", &row(json!({"visits": 2})))
        .await
        .unwrap();
    assert_eq!(affected, 1);
    blog.db
        .increment(&ctx, &products, "3", &row(json!({"visits": "3"})))
        .await
        .unwrap();

    let product = blog.db.read_one(&ctx, &products, &[], "3").await.unwrap().unwrap();
    assert_eq!(product["visits"], json!(5));

    let affected = blog
        .db
        .increment(&ctx, &products, "3", &row(json!({"name": "x"})))
        .await
        .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
async fn test_update_and_delete_report_affected_rows() {
    let blog = blog().await;
    let comments = table(&blog, "comments").await;
    let ctx = RequestContext::new();

    let affected = blog
        .db
        .update(&ctx, &comments, "2", &row(json!({"message": "edited"})))
        .await
        .unwrap();
    assert_eq!(affected, 1);
    let affected = blog
        .db
        .update(&ctx, &comments, "42", &row(json!({"message": "edited"})))
        .await
        .unwrap();
    assert_eq!(affected, 0);

    assert_eq!(blog.db.delete(&ctx, &comments, "2").await.unwrap(), 1);
    assert_eq!(blog.db.delete(&ctx, &comments, "2").await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_count_and_page() {
    let blog = blog().await;
    let products = table(&blog, "products").await;
    let ctx = RequestContext::new();
    let in_stock = Condition::from_filter(&products, "in_stock,eq,1");

    assert_eq!(blog.db.count(&ctx, &products, &Condition::No).await.unwrap(), 11);
    assert_eq!(blog.db.count(&ctx, &products, &in_stock).await.unwrap(), 5);

    let rows = blog
        .db
        .list_all(
            &ctx,
            &products,
            &["id".to_string()],
            &in_stock,
            &[OrderByExpr::desc("id")],
            1,
            Some(2),
        )
        .await
        .unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(4), json!(3)]);
}

#[tokio::test]
async fn test_request_condition_hides_records() {
    let blog = blog().await;
    let posts = table(&blog, "posts").await;
    let ctx = RequestContext::new()
        .with_condition("posts", Condition::from_filter(&posts, "category_id,eq,2"));

    assert!(blog.db.read_one(&ctx, &posts, &[], "1").await.unwrap().is_none());
    assert!(blog.db.read_one(&ctx, &posts, &[], "2").await.unwrap().is_some());
    assert_eq!(blog.db.count(&ctx, &posts, &Condition::No).await.unwrap(), 1);
    assert_eq!(blog.db.delete(&ctx, &posts, "1").await.unwrap(), 0);
}
