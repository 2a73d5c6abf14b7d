//! Typed HTML documents for the pre-rendered pages.
//!
//! Every value coming from the database is interpolated through maud, which
//! escapes it for the text or attribute context it lands in. The only raw
//! fragments are the asset tags lifted from our own client build, JSON that
//! went through [`script_json`], and the post body authored in the CMS.

use chrono::{DateTime, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde_json::Value;

use crate::config::SiteSettings;

/// Client bundle tags found in the base `index.html`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetTags {
    pub head: Vec<String>,
    pub body: Vec<String>,
}

impl AssetTags {
    /// Pulls `<script src>` and stylesheet/preload/icon `<link>` tags out of the
    /// built template, keeping the head/body split of the original.
    pub fn extract(base_html: &str) -> Self {
        let lower = base_html.to_ascii_lowercase();
        let split = lower.find("<body").unwrap_or(base_html.len());

        AssetTags {
            head: collect_tags(&base_html[..split], &lower[..split]),
            body: collect_tags(&base_html[split..], &lower[split..]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.body.is_empty()
    }
}

fn collect_tags(html: &str, lower: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();

    let mut cursor = 0;
    while let Some(start) = lower[cursor..].find("<script").map(|i| i + cursor) {
        let Some(close) = lower[start..].find("</script>").map(|i| i + start + "</script>".len()) else {
            break;
        };
        let open_end = lower[start..].find('>').map(|i| i + start).unwrap_or(close);
        if lower[start..open_end].contains(" src=") {
            found.push((start, html[start..close].to_string()));
        }
        cursor = close;
    }

    cursor = 0;
    while let Some(start) = lower[cursor..].find("<link").map(|i| i + cursor) {
        let Some(end) = lower[start..].find('>').map(|i| i + start + 1) else {
            break;
        };
        let tag = &lower[start..end];
        let wanted = ["stylesheet", "modulepreload", "icon", "manifest"]
            .iter()
            .any(|rel| tag.contains(&format!("rel=\"{rel}\"")) || tag.contains(&format!("rel={rel}")));
        if wanted {
            found.push((start, html[start..end].to_string()));
        }
        cursor = end;
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, tag)| tag).collect()
}

/// JSON safe to place inside a `<script>` element: markup characters only
/// occur inside JSON strings, where the `\uXXXX` form means the same thing.
pub fn script_json(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Head metadata of one page.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
    pub og_type: &'static str,
    pub image: Option<String>,
    pub keywords: Vec<String>,
    pub author: Option<String>,
    pub published_time: Option<DateTime<Utc>>,
    pub json_ld: Value,
}

/// A complete document: metadata, pre-rendered markup inside the `#root`
/// mount point, optional hydration data and the client bundle.
pub fn render_document(
    site: &SiteSettings,
    meta: &PageMeta,
    assets: &AssetTags,
    root: Markup,
    data: Option<&Value>,
) -> String {
    let twitter_card = if meta.image.is_some() {
        "summary_large_image"
    } else {
        "summary"
    };

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (meta.title) }
                meta name="description" content=(meta.description);
                @if !meta.keywords.is_empty() {
                    meta name="keywords" content=(meta.keywords.join(", "));
                }
                @if let Some(author) = &meta.author {
                    meta name="author" content=(author);
                }
                link rel="canonical" href=(meta.canonical_url);

                meta property="og:type" content=(meta.og_type);
                meta property="og:site_name" content=(site.name);
                meta property="og:title" content=(meta.title);
                meta property="og:description" content=(meta.description);
                meta property="og:url" content=(meta.canonical_url);
                @if let Some(image) = &meta.image {
                    meta property="og:image" content=(image);
                }
                @if let Some(published) = meta.published_time {
                    meta property="article:published_time" content=(published.to_rfc3339());
                }

                meta name="twitter:card" content=(twitter_card);
                meta name="twitter:title" content=(meta.title);
                meta name="twitter:description" content=(meta.description);
                @if let Some(image) = &meta.image {
                    meta name="twitter:image" content=(image);
                }

                script type="application/ld+json" { (PreEscaped(script_json(&meta.json_ld))) }

                @if let Some(id) = &site.ga_measurement_id {
                    script defer src=(format!("https://www.googletagmanager.com/gtag/js?id={id}")) {}
                    script {
                        (PreEscaped(format!(
                            "window.dataLayer=window.dataLayer||[];function gtag(){{dataLayer.push(arguments);}}gtag('js',new Date());gtag('config',{});",
                            script_json(&Value::String(id.clone()))
                        )))
                    }
                }

                @for tag in &assets.head {
                    (PreEscaped(tag))
                }
            }
            body {
                div id="root" { (root) }
                @if let Some(data) = data {
                    script id="__PRERENDERED_DATA__" type="application/json" { (PreEscaped(script_json(data))) }
                }
                @for tag in &assets.body {
                    (PreEscaped(tag))
                }
            }
        }
    };

    markup.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <link rel="icon" type="image/svg+xml" href="/favicon.svg" />
    <title>Placeholder</title>
    <script type="module" crossorigin src="/assets/index-abc123.js"></script>
    <link rel="stylesheet" crossorigin href="/assets/index-def456.css">
    <script>window.inline = true;</script>
  </head>
  <body>
    <div id="root"></div>
    <script src="/assets/legacy.js"></script>
  </body>
</html>"#;

    fn meta(title: &str) -> PageMeta {
        PageMeta {
            title: title.to_string(),
            description: "It's \"quoted\" & <b>bold</b>".to_string(),
            canonical_url: "https://example.com/blog/a-b-co".to_string(),
            og_type: "article",
            image: None,
            keywords: vec![],
            author: Some("Jane <Doe>".to_string()),
            published_time: None,
            json_ld: json!({ "headline": title }),
        }
    }

    #[test]
    fn extracts_bundle_tags_only() {
        let assets = AssetTags::extract(BASE);
        assert_eq!(assets.head.len(), 3);
        assert!(assets.head[0].contains("favicon.svg"));
        assert!(assets.head[1].contains("index-abc123.js"));
        assert!(assets.head[2].contains("index-def456.css"));
        assert_eq!(assets.body, vec![r#"<script src="/assets/legacy.js"></script>"#.to_string()]);
    }

    #[test]
    fn script_json_cannot_close_the_script() {
        let out = script_json(&json!({ "t": "</script><!-- A & B" }));
        assert!(!out.contains('<'));
        assert!(!out.contains('&'));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back["t"], "</script><!-- A & B");
    }

    #[test]
    fn user_strings_are_escaped_everywhere() {
        let html = render_document(
            &SiteSettings::default(),
            &meta("A & B <Co>"),
            &AssetTags::default(),
            html! { h1 { "A & B <Co>" } },
            None,
        );

        assert!(html.contains("<title>A &amp; B &lt;Co&gt;</title>"));
        assert!(html.contains(r#"<meta property="og:title" content="A &amp; B &lt;Co&gt;">"#));
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(html.contains(r#"content="Jane &lt;Doe&gt;""#));
        assert!(!html.contains("<Co>"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[test]
    fn analytics_snippet_only_when_configured() {
        let mut site = SiteSettings::default();
        let plain = render_document(&site, &meta("x"), &AssetTags::default(), html! {}, None);
        assert!(!plain.contains("googletagmanager"));

        site.ga_measurement_id = Some("G-ABC123".to_string());
        let tracked = render_document(&site, &meta("x"), &AssetTags::default(), html! {}, None);
        assert!(tracked.contains("gtag/js?id=G-ABC123"));
        assert!(tracked.contains(r#"gtag('config',"G-ABC123")"#));
    }
}
