//! RecordService against the seeded SQLite blog database.

#[path = "../common/mod.rs"]
mod common;

use serde_json::{json, Value};

use autocrud::db::RequestContext;
use autocrud::record::Params;
use autocrud::Error;

use common::blog;

fn ids(records: &[autocrud::db::Row]) -> Vec<Value> {
    records.iter().map(|r| r["id"].clone()).collect()
}

#[tokio::test]
async fn test_list_post_with_joins() {
    let blog = blog().await;
    let params = Params::new()
        .with("filter", "id,eq,1")
        .with("join", "categories")
        .with("join", "comments")
        .with("join", "tags");

    let doc = blog
        .records
        .list(&RequestContext::new(), "posts", &params)
        .await
        .unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.results, None);

    let post = &doc.records[0];
    assert_eq!(post["content"], json!("blog started"));
    assert_eq!(
        post["categories"],
        json!({"id": 1, "name": "announcement", "icon": null})
    );
    assert_eq!(
        post["comments"],
        json!([
            {"id": 1, "post_id": 1, "message": "great"},
            {"id": 2, "post_id": 1, "message": "fantastic"}
        ])
    );
    assert_eq!(
        post["tags"],
        json!([
            {"id": 1, "name": "funny", "is_important": false},
            {"id": 2, "name": "important", "is_important": true}
        ])
    );
}

#[tokio::test]
async fn test_list_last_page_holds_remainder() {
    let blog = blog().await;
    let params = Params::new().with("page", "3,5").with("order", "id");

    let doc = blog
        .records
        .list(&RequestContext::new(), "products", &params)
        .await
        .unwrap();
    assert_eq!(doc.results, Some(11));
    assert_eq!(ids(&doc.records), vec![json!(11)]);
}

#[tokio::test]
async fn test_list_page_beyond_any_offset_is_empty() {
    let blog = blog().await;
    let params = Params::new().with("page", "9223372036854775807,5");

    let doc = blog
        .records
        .list(&RequestContext::new(), "products", &params)
        .await
        .unwrap();
    assert_eq!(doc.results, Some(11));
    assert!(doc.is_empty());
}

#[tokio::test]
async fn test_list_ordering_and_size() {
    let blog = blog().await;
    let params = Params::new()
        .with("order", "in_stock,desc")
        .with("order", "id,desc")
        .with("size", "3");

    let doc = blog
        .records
        .list(&RequestContext::new(), "products", &params)
        .await
        .unwrap();
    assert_eq!(doc.results, None);
    assert_eq!(ids(&doc.records), vec![json!(5), json!(4), json!(3)]);
}

#[tokio::test]
async fn test_list_include_and_exclude() {
    let blog = blog().await;
    let ctx = RequestContext::new();

    let doc = blog
        .records
        .list(&ctx, "users", &Params::new().with("exclude", "password"))
        .await
        .unwrap();
    assert_eq!(
        Value::Object(doc.records[0].clone()),
        json!({"id": 1, "username": "user1"})
    );

    let doc = blog
        .records
        .list(&ctx, "users", &Params::new().with("include", "username"))
        .await
        .unwrap();
    assert_eq!(
        Value::Object(doc.records[1].clone()),
        json!({"username": "user2"})
    );
}

#[tokio::test]
async fn test_excluding_every_column_leaves_empty_records() {
    let blog = blog().await;
    let params = Params::new().with("include", "*.*").with("exclude", "*");

    let doc = blog
        .records
        .list(&RequestContext::new(), "products", &params)
        .await
        .unwrap();
    assert_eq!(doc.len(), 11);
    assert!(doc.records.iter().all(|r| r.is_empty()));

    let tag = blog
        .records
        .read(&RequestContext::new(), "tags", "1", &params)
        .await
        .unwrap();
    assert!(tag.is_empty());
}

#[tokio::test]
async fn test_include_keeps_join_keys() {
    let blog = blog().await;
    let params = Params::new()
        .with("include", "content,categories.name")
        .with("join", "categories");

    let post = blog
        .records
        .read(&RequestContext::new(), "posts", "2", &params)
        .await
        .unwrap();
    assert_eq!(post["content"], json!("It works!"));
    assert_eq!(post["category_id"], json!(2));
    assert_eq!(post["categories"], json!({"id": 2, "name": "article"}));
    assert!(!post.contains_key("user_id"));
}

#[tokio::test]
async fn test_read_missing_record() {
    let blog = blog().await;
    let err = blog
        .records
        .read(&RequestContext::new(), "posts", "7", &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(id) if id == "7"));
}

#[tokio::test]
async fn test_read_is_repeatable() {
    let blog = blog().await;
    let ctx = RequestContext::new();
    let params = Params::new().with("join", "comments");

    let first = blog.records.read(&ctx, "posts", "1", &params).await.unwrap();
    let second = blog.records.read(&ctx, "posts", "1", &params).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_read_batch_marks_missing_as_null() {
    let blog = blog().await;
    let keys = vec!["2".to_string(), "5".to_string(), "1".to_string()];

    let records = blog
        .records
        .read_batch(&RequestContext::new(), "tags", &keys, &Params::new())
        .await
        .unwrap();
    assert_eq!(
        records,
        vec![
            json!({"id": 2, "name": "important", "is_important": true}),
            Value::Null,
            json!({"id": 1, "name": "funny", "is_important": false}),
        ]
    );
}

#[tokio::test]
async fn test_unknown_table() {
    let blog = blog().await;
    let ctx = RequestContext::new();

    assert!(!blog.records.exists("videos").await.unwrap());
    let err = blog
        .records
        .list(&ctx, "videos", &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TableNotFound(name) if name == "videos"));
    let err = blog.records.delete(&ctx, "videos", "1").await.unwrap_err();
    assert!(matches!(err, Error::TableNotFound(_)));
}

#[tokio::test]
async fn test_create_rejects_non_object() {
    let blog = blog().await;
    let err = blog
        .records
        .create(&RequestContext::new(), "tags", &json!(["funny"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_create_and_create_batch() {
    let blog = blog().await;
    let ctx = RequestContext::new();

    let key = blog
        .records
        .create(&ctx, "tags", &json!({"name": "boring", "is_important": false}))
        .await
        .unwrap();
    assert_eq!(key, json!(3));

    let keys = blog
        .records
        .create_batch(
            &ctx,
            "tags",
            &[
                json!({"name": "urgent", "is_important": true}),
                json!({"name": "later", "is_important": false, "color": "red"}),
            ],
        )
        .await
        .unwrap();
    assert_eq!(keys, vec![json!(4), json!(5)]);

    let tag = blog
        .records
        .read(&ctx, "tags", "4", &Params::new())
        .await
        .unwrap();
    assert_eq!(tag["is_important"], json!(true));
}

#[tokio::test]
async fn test_update_never_changes_key() {
    let blog = blog().await;
    let ctx = RequestContext::new();

    let affected = blog
        .records
        .update(&ctx, "categories", "2", &json!({"id": 9, "name": "news"}))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let category = blog
        .records
        .read(&ctx, "categories", "2", &Params::new())
        .await
        .unwrap();
    assert_eq!(category["id"], json!(2));
    assert_eq!(category["name"], json!("news"));
}

#[tokio::test]
async fn test_update_batch_count_mismatch() {
    let blog = blog().await;
    let keys = vec!["1".to_string(), "2".to_string()];

    let err = blog
        .records
        .update_batch(&RequestContext::new(), "tags", &keys, &[json!({"name": "x"})])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ArgumentCountMismatch { ids: 2, records: 1 }
    ));

    let counts = blog
        .records
        .update_batch(
            &RequestContext::new(),
            "tags",
            &keys,
            &[json!({"name": "a"}), json!({"name": "b"})],
        )
        .await
        .unwrap();
    assert_eq!(counts, vec![1, 1]);
}

#[tokio::test]
async fn test_increment_batch() {
    let blog = blog().await;
    let ctx = RequestContext::new();
    let keys = vec!["1".to_string(), "2".to_string(), "99".to_string()];

    let counts = blog
        .records
        .increment_batch(
            &ctx,
            "products",
            &keys,
            &[json!({"visits": 1}), json!({"visits": 2}), json!({"visits": 3})],
        )
        .await
        .unwrap();
    assert_eq!(counts, vec![1, 1, 0]);

    let doc = blog
        .records
        .list(
            &ctx,
            "products",
            &Params::new().with("filter", "visits,gt,0").with("include", "id,visits"),
        )
        .await
        .unwrap();
    assert_eq!(
        doc.records
            .into_iter()
            .map(Value::Object)
            .collect::<Vec<_>>(),
        vec![json!({"id": 1, "visits": 1}), json!({"id": 2, "visits": 2})]
    );
}

#[tokio::test]
async fn test_delete_batch() {
    let blog = blog().await;
    let ctx = RequestContext::new();
    let keys = vec!["1".to_string(), "2".to_string(), "9".to_string()];

    let counts = blog.records.delete_batch(&ctx, "comments", &keys).await.unwrap();
    assert_eq!(counts, vec![1, 1, 0]);

    let doc = blog
        .records
        .list(&ctx, "comments", &Params::new())
        .await
        .unwrap();
    assert!(doc.is_empty());
}
