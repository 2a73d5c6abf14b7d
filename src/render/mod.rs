//! Build-time page renderer.
//!
//! Reads the client build's `index.html`, then writes one static document per
//! published post and per marketing route, plus `sitemap.xml`, `robots.txt`
//! and the JSON exports under `data/`. A missing build directory is not an
//! error: the site keeps working as a plain SPA.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Utc;
use maud::{html, Markup, PreEscaped};
use serde_json::{json, Value};

use crate::{
    config::SiteSettings,
    db::{posts, DbPool},
    models::blog_post::{BlogPost, ClientPost, CreatePostSchema},
    utils::text::word_count,
};

pub mod pages;
pub mod template;

use pages::{MarketingRoute, MARKETING_ROUTES};
use template::{render_document, AssetTags, PageMeta};

/// What a render pass produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub skipped: bool,
    pub posts: usize,
    pub routes: usize,
    pub files: Vec<PathBuf>,
}

/// Loads the published posts and renders the site into `dist`.
pub async fn render_site(pool: &DbPool, site: &SiteSettings, dist: &Path) -> anyhow::Result<RenderReport> {
    let template_path = dist.join("index.html");
    if !template_path.is_file() {
        tracing::warn!(
            "Build output not found at {}, skipping pre-render (SPA mode)",
            template_path.display()
        );
        return Ok(RenderReport {
            skipped: true,
            ..Default::default()
        });
    }

    let published = posts::all_published(pool).await?;
    write_site(site, dist, &published)
}

/// Renders `posts` into `dist`, whose `index.html` is the client template.
pub fn write_site(site: &SiteSettings, dist: &Path, posts: &[BlogPost]) -> anyhow::Result<RenderReport> {
    let template_path = dist.join("index.html");
    let base_html = fs::read_to_string(&template_path)
        .with_context(|| format!("failed to read {}", template_path.display()))?;
    let assets = AssetTags::extract(&base_html);
    if assets.is_empty() {
        tracing::warn!("No client bundle tags found in {}", template_path.display());
    }

    let mut report = RenderReport::default();

    for post in posts.iter().filter(|p| p.is_published()) {
        let html = render_post_page(site, &assets, post);
        report.files.push(write_file(dist, &format!("blog/{}/index.html", post.slug), &html)?);
        report.posts += 1;
        tracing::debug!(slug = %post.slug, "rendered post");
    }

    for route in MARKETING_ROUTES {
        let html = render_route_page(site, &assets, route, posts);
        report.files.push(write_file(dist, &route.output_path(), &html)?);
        report.routes += 1;
    }

    report.files.push(write_file(dist, "sitemap.xml", &sitemap(site, posts))?);
    report.files.push(write_file(dist, "robots.txt", &robots(site))?);
    report.files.extend(write_exports(site, dist, posts)?);

    tracing::info!(
        posts = report.posts,
        routes = report.routes,
        "📝 Pre-rendered {} files into {}",
        report.files.len(),
        dist.display()
    );
    Ok(report)
}

fn write_file(dist: &Path, relative: &str, contents: &str) -> anyhow::Result<PathBuf> {
    let path = dist.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn absolute(site: &SiteSettings, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}/{}", site.url, path.trim_start_matches('/'))
    }
}

fn post_url(site: &SiteSettings, post: &BlogPost) -> String {
    post.canonical_url
        .clone()
        .unwrap_or_else(|| absolute(site, &format!("/blog/{}", post.slug)))
}

/// `BlogPosting` structured data for one post.
pub fn blog_posting_ld(site: &SiteSettings, post: &BlogPost) -> Value {
    let url = post_url(site, post);
    let words = word_count(&post.content);

    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": post.title,
        "description": post.seo_description(),
        "author": { "@type": "Person", "name": post.author },
        "publisher": { "@type": "Organization", "name": site.name, "url": site.url },
        "datePublished": post.published_at.unwrap_or(post.created_at).to_rfc3339(),
        "dateModified": post.updated_at.to_rfc3339(),
        "mainEntityOfPage": { "@type": "WebPage", "@id": url },
        "url": url,
        "articleSection": post.category,
        "keywords": post.target_keywords.iter().chain(post.tags.iter()).cloned().collect::<Vec<_>>().join(", "),
        "wordCount": words,
        "timeRequired": format!("PT{}M", post.reading_time),
    });
    if let Some(image) = &post.featured_image {
        ld["image"] = Value::String(absolute(site, image));
    }
    ld
}

fn post_body(post: &BlogPost) -> Markup {
    html! {
        article class="blog-post" {
            header {
                p class="blog-post__category" { (post.category) }
                h1 { (post.title) }
                p class="blog-post__meta" {
                    "By " (post.author) " · " (post.reading_time) " min read"
                    @if let Some(published) = post.published_at {
                        " · "
                        time datetime=(published.to_rfc3339()) { (published.format("%B %-d, %Y").to_string()) }
                    }
                }
            }
            @if let Some(image) = &post.featured_image {
                img class="blog-post__image" src=(image) alt=(post.title);
            }
            // CMS-authored HTML
            div class="blog-post__content" { (PreEscaped(&post.content)) }
            @if !post.tags.is_empty() {
                ul class="blog-post__tags" {
                    @for tag in &post.tags {
                        li { (tag) }
                    }
                }
            }
        }
    }
}

pub fn render_post_page(site: &SiteSettings, assets: &AssetTags, post: &BlogPost) -> String {
    let meta = PageMeta {
        title: format!("{} | {}", post.seo_title(), site.name),
        description: post.seo_description().to_string(),
        canonical_url: post_url(site, post),
        og_type: "article",
        image: post.featured_image.as_deref().map(|i| absolute(site, i)),
        keywords: post.target_keywords.clone(),
        author: Some(post.author.clone()),
        published_time: post.published_at,
        json_ld: blog_posting_ld(site, post),
    };
    let data = json!({ "post": ClientPost::from(post) });

    render_document(site, &meta, assets, post_body(post), Some(&data))
}

// Visually hidden but readable by crawlers; the client app replaces it on hydration
const SEO_BLOCK_STYLE: &str =
    "position:absolute;left:-10000px;top:auto;width:1px;height:1px;overflow:hidden;";

pub fn render_route_page(
    site: &SiteSettings,
    assets: &AssetTags,
    route: &MarketingRoute,
    posts: &[BlogPost],
) -> String {
    let url = absolute(site, route.path);
    let is_home = route.path == "/";
    let title = if is_home {
        format!("{} | {}", site.name, route.title)
    } else {
        format!("{} | {}", route.title, site.name)
    };

    let json_ld = if is_home {
        json!({
            "@context": "https://schema.org",
            "@type": "Organization",
            "name": site.name,
            "url": site.url,
            "description": route.description,
        })
    } else {
        json!({
            "@context": "https://schema.org",
            "@type": "WebPage",
            "name": route.title,
            "url": url,
            "description": route.description,
            "isPartOf": { "@type": "WebSite", "name": site.name, "url": site.url },
        })
    };

    let meta = PageMeta {
        title,
        description: route.description.to_string(),
        canonical_url: url,
        og_type: "website",
        image: None,
        keywords: Vec::new(),
        author: None,
        published_time: None,
        json_ld,
    };

    let list_posts = route.path == "/blog";
    let root = html! {
        div id="seo-content" style=(SEO_BLOCK_STYLE) {
            h1 { (route.heading) }
            @for paragraph in route.paragraphs {
                p { (paragraph) }
            }
            @if list_posts {
                ul {
                    @for post in posts.iter().filter(|p| p.is_published()) {
                        li {
                            a href=(format!("/blog/{}", post.slug)) { (post.title) }
                            @if let Some(excerpt) = &post.excerpt {
                                " - " (excerpt)
                            }
                        }
                    }
                }
            }
            nav {
                @for other in MARKETING_ROUTES {
                    a href=(other.path) { (other.title) } " "
                }
            }
        }
    };

    render_document(site, &meta, assets, root, None)
}

pub fn sitemap(site: &SiteSettings, posts: &[BlogPost]) -> String {
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let markup = html! {
        (PreEscaped("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"))
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for route in MARKETING_ROUTES {
                url {
                    loc { (absolute(site, route.path)) }
                    lastmod { (today) }
                    changefreq { "weekly" }
                    priority { @if route.path == "/" { "1.0" } @else { "0.8" } }
                }
            }
            @for post in posts.iter().filter(|p| p.is_published()) {
                url {
                    loc { (post_url(site, post)) }
                    lastmod { (post.updated_at.format("%Y-%m-%d").to_string()) }
                    changefreq { "monthly" }
                    priority { "0.7" }
                }
            }
        }
    };
    markup.into_string()
}

pub fn robots(site: &SiteSettings) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        site.url
    )
}

/// `data/posts.json`, one `data/<slug>.json` per post and `data/metadata.json`.
fn write_exports(site: &SiteSettings, dist: &Path, posts: &[BlogPost]) -> anyhow::Result<Vec<PathBuf>> {
    let mut published: Vec<&BlogPost> = posts.iter().filter(|p| p.is_published()).collect();
    published.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let client: Vec<ClientPost> = published.iter().map(|p| ClientPost::from(*p)).collect();
    let mut files = vec![write_file(dist, "data/posts.json", &serde_json::to_string_pretty(&client)?)?];

    for post in &client {
        files.push(write_file(
            dist,
            &format!("data/{}.json", post.slug),
            &serde_json::to_string_pretty(post)?,
        )?);
    }

    let mut categories: Vec<&str> = client.iter().map(|p| p.category.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();
    let mut tags: Vec<&str> = client.iter().flat_map(|p| p.tags.iter().map(String::as_str)).collect();
    tags.sort_unstable();
    tags.dedup();

    let metadata = json!({
        "siteName": site.name,
        "siteUrl": site.url,
        "generatedAt": Utc::now(),
        "postCount": client.len(),
        "categories": categories,
        "tags": tags,
    });
    files.push(write_file(dist, "data/metadata.json", &serde_json::to_string_pretty(&metadata)?)?);

    Ok(files)
}

/// Loads a `posts.json` export back into the store. Slugs that already exist are skipped.
pub async fn import_posts(pool: &DbPool, file: &Path, default_author: &str) -> anyhow::Result<usize> {
    let raw = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let exported: Vec<ClientPost> =
        serde_json::from_str(&raw).with_context(|| format!("{} is not a posts export", file.display()))?;

    let mut imported = 0;
    for post in exported {
        if posts::slug_exists(pool, &post.slug).await? {
            tracing::info!(slug = %post.slug, "already present, skipping");
            continue;
        }
        let new_post = CreatePostSchema::from(post).validate()?;
        posts::create(pool, new_post, default_author).await?;
        imported += 1;
    }

    tracing::info!("Imported {} posts from {}", imported, file.display());
    Ok(imported)
}
