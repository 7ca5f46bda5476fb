//! Relation expansion over the blog database.

#[path = "../common/mod.rs"]
mod common;

use serde_json::json;

use autocrud::db::{JoinLimits, RequestContext};
use autocrud::record::{Condition, Params};

use common::blog;

#[tokio::test]
async fn test_nested_join_through_junction() {
    let blog = blog().await;
    let params = Params::new()
        .with("join", "posts,tags")
        .with("include", "categories.name,posts.content,tags.name");

    let doc = blog
        .records
        .list(&RequestContext::new(), "categories", &params)
        .await
        .unwrap();
    assert_eq!(doc.len(), 2);

    let first = &doc.records[0];
    assert_eq!(first["name"], json!("announcement"));
    assert_eq!(first["posts"][0]["content"], json!("blog started"));
    assert_eq!(
        first["posts"][0]["tags"],
        json!([{"id": 1, "name": "funny"}, {"id": 2, "name": "important"}])
    );

    let second = &doc.records[1];
    assert_eq!(second["posts"][0]["content"], json!("It works!"));
    assert_eq!(second["posts"][0]["tags"], json!([]));
}

#[tokio::test]
async fn test_has_many_defaults_to_empty_list() {
    let blog = blog().await;
    let params = Params::new().with("join", "comments");

    let doc = blog
        .records
        .list(&RequestContext::new(), "posts", &params)
        .await
        .unwrap();
    assert_eq!(doc.records[0]["comments"].as_array().map(Vec::len), Some(2));
    assert_eq!(doc.records[1]["comments"], json!([]));
}

#[tokio::test]
async fn test_belongs_to_hidden_parent_is_null() {
    let blog = blog().await;
    let categories = blog.reflection.table("categories").await.unwrap().unwrap();
    let ctx = RequestContext::new()
        .with_condition("categories", Condition::from_filter(&categories, "id,eq,1"));

    let doc = blog
        .records
        .list(&ctx, "posts", &Params::new().with("join", "categories"))
        .await
        .unwrap();
    assert_eq!(doc.records[0]["categories"]["name"], json!("announcement"));
    assert_eq!(doc.records[1]["categories"], json!(null));
}

#[tokio::test]
async fn test_unrelated_table_is_skipped() {
    let blog = blog().await;
    let params = Params::new().with("join", "tags").with("join", "videos");

    let user = blog
        .records
        .read(&RequestContext::new(), "users", "1", &params)
        .await
        .unwrap();
    assert!(!user.contains_key("tags"));
    assert!(!user.contains_key("videos"));
}

#[tokio::test]
async fn test_max_records_caps_related_rows() {
    let blog = blog().await;
    let ctx = RequestContext::new().with_join_limits(JoinLimits {
        max_records: Some(1),
        ..JoinLimits::default()
    });
    let params = Params::new().with("join", "comments").with("join", "tags");

    let post = blog.records.read(&ctx, "posts", "1", &params).await.unwrap();
    assert_eq!(
        post["comments"],
        json!([{"id": 1, "post_id": 1, "message": "great"}])
    );
    assert_eq!(
        post["tags"],
        json!([{"id": 1, "name": "funny", "is_important": false}])
    );
}

#[tokio::test]
async fn test_max_depth_truncates_chains() {
    let blog = blog().await;
    let ctx = RequestContext::new().with_join_limits(JoinLimits {
        max_depth: Some(1),
        ..JoinLimits::default()
    });
    let params = Params::new().with("join", "posts,comments");

    let category = blog
        .records
        .read(&ctx, "categories", "1", &params)
        .await
        .unwrap();
    let post = &category["posts"][0];
    assert_eq!(post["content"], json!("blog started"));
    assert!(post.get("comments").is_none());
}

#[tokio::test]
async fn test_max_tables_stops_expansion() {
    let blog = blog().await;
    let ctx = RequestContext::new().with_join_limits(JoinLimits {
        max_tables: Some(1),
        ..JoinLimits::default()
    });
    let params = Params::new().with("join", "comments").with("join", "tags");

    let post = blog.records.read(&ctx, "posts", "1", &params).await.unwrap();
    assert!(post.contains_key("comments"));
    assert!(!post.contains_key("tags"));
}

#[tokio::test]
async fn test_excluded_related_columns_leave_empty_objects() {
    let blog = blog().await;
    let params = Params::new()
        .with("exclude", "posts.*")
        .with("join", "posts");

    let doc = blog
        .records
        .list(&RequestContext::new(), "categories", &params)
        .await
        .unwrap();
    assert_eq!(
        serde_json::Value::Object(doc.records[0].clone()),
        json!({"id": 1, "name": "announcement", "icon": null, "posts": [{}]})
    );
    assert_eq!(doc.records[1]["posts"], json!([{}]));
}
