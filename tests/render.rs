mod common;

use std::fs;

use common::TestApp;
use serde_json::Value;
use site_backend::{
    config::SiteSettings,
    db::posts,
    models::blog_post::{CreatePostSchema, PostStatus},
    render::{import_posts, render_site},
};
use tempfile::TempDir;

const CLIENT_INDEX: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>Northwind</title>
    <script type="module" crossorigin src="/assets/index-Bx1.js"></script>
    <link rel="stylesheet" crossorigin href="/assets/index-Cq2.css">
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>"#;

fn site() -> SiteSettings {
    SiteSettings {
        url: "https://northwind.example".to_string(),
        ..Default::default()
    }
}

fn dist_with_index() -> TempDir {
    let dist = TempDir::new().unwrap();
    fs::write(dist.path().join("index.html"), CLIENT_INDEX).unwrap();
    dist
}

async fn seed_tricky_post(app: &TestApp) {
    let schema = CreatePostSchema {
        title: Some("A & B <Co>".to_string()),
        slug: Some("a-b-co".to_string()),
        content: Some("<p>Partners \"quoted\" here</p>".to_string()),
        category: Some("news".to_string()),
        excerpt: Some("Why <script>alert(1)</script> fails".to_string()),
        tags: vec!["ops".to_string(), "ai".to_string()],
        status: Some(PostStatus::Published),
        ..Default::default()
    };
    posts::create(app.pool(), schema.validate().unwrap(), "Ana").await.unwrap();
}

#[tokio::test]
async fn renders_posts_routes_and_exports() {
    let app = TestApp::new().await;
    seed_tricky_post(&app).await;
    app.seed_post("draft-only", PostStatus::Draft, "<p>secret</p>").await;
    let dist = dist_with_index();

    let report = render_site(app.pool(), &site(), dist.path()).await.unwrap();
    assert!(!report.skipped);
    assert_eq!(report.posts, 1);
    assert_eq!(report.routes, 9);

    let page = fs::read_to_string(dist.path().join("blog/a-b-co/index.html")).unwrap();
    assert!(page.contains("<title>A &amp; B &lt;Co&gt; | Northwind Automation</title>"));
    assert!(page.contains(r#"<link rel="canonical" href="https://northwind.example/blog/a-b-co">"#));
    assert!(page.contains("\"@type\":\"BlogPosting\""));
    assert!(page.contains("\"timeRequired\":\"PT1M\""));
    assert!(page.contains(r#"<script id="__PRERENDERED_DATA__" type="application/json">"#));
    assert!(page.contains("/assets/index-Bx1.js"));
    assert!(page.contains("/assets/index-Cq2.css"));
    assert!(!page.contains("<Co>"));
    assert!(!page.contains("<script>alert(1)"));

    assert!(!dist.path().join("blog/draft-only").exists());

    for route in ["index.html", "services/index.html", "services/data-analytics/index.html", "blog/index.html"] {
        assert!(dist.path().join(route).is_file(), "{route}");
    }
    let blog_index = fs::read_to_string(dist.path().join("blog/index.html")).unwrap();
    assert!(blog_index.contains(r#"<a href="/blog/a-b-co">A &amp; B &lt;Co&gt;</a>"#));
    assert!(blog_index.contains("seo-content"));

    let sitemap = fs::read_to_string(dist.path().join("sitemap.xml")).unwrap();
    assert!(sitemap.starts_with("<?xml"));
    assert!(sitemap.contains("<loc>https://northwind.example/blog/a-b-co</loc>"));
    assert!(sitemap.contains("<loc>https://northwind.example/services/ai-automation</loc>"));
    assert!(!sitemap.contains("draft-only"));

    let robots = fs::read_to_string(dist.path().join("robots.txt")).unwrap();
    assert!(robots.contains("Sitemap: https://northwind.example/sitemap.xml"));

    let exported: Value =
        serde_json::from_str(&fs::read_to_string(dist.path().join("data/posts.json")).unwrap()).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 1);
    assert_eq!(exported[0]["url"], "/blog/a-b-co");
    assert!(dist.path().join("data/a-b-co.json").is_file());

    let metadata: Value =
        serde_json::from_str(&fs::read_to_string(dist.path().join("data/metadata.json")).unwrap()).unwrap();
    assert_eq!(metadata["postCount"], 1);
    assert_eq!(metadata["tags"], serde_json::json!(["ai", "ops"]));
}

#[tokio::test]
async fn missing_build_output_is_skipped() {
    let app = TestApp::new().await;
    let dist = TempDir::new().unwrap();

    let report = render_site(app.pool(), &site(), &dist.path().join("dist")).await.unwrap();
    assert!(report.skipped);
    assert!(report.files.is_empty());

    let report = render_site(app.pool(), &site(), dist.path()).await.unwrap();
    assert!(report.skipped);
    assert_eq!(fs::read_dir(dist.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn exported_posts_import_into_a_fresh_store() {
    let source = TestApp::new().await;
    seed_tricky_post(&source).await;
    let dist = dist_with_index();
    render_site(source.pool(), &site(), dist.path()).await.unwrap();

    let target = TestApp::new().await;
    let export = dist.path().join("data/posts.json");
    assert_eq!(import_posts(target.pool(), &export, "Fallback").await.unwrap(), 1);
    // Already present slugs are skipped
    assert_eq!(import_posts(target.pool(), &export, "Fallback").await.unwrap(), 0);

    let imported = posts::get_by_slug(target.pool(), "a-b-co").await.unwrap();
    assert_eq!(imported.title, "A & B <Co>");
    assert_eq!(imported.tags, vec!["ops".to_string(), "ai".to_string()]);
    assert_eq!(imported.author, "Ana");
}
