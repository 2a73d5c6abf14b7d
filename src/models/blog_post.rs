use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    error::AppError,
    utils::text::{is_url_safe_slug, normalize_list},
};

pub const META_TITLE_MAX: usize = 60;
pub const META_DESCRIPTION_MAX: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CtaType {
    #[default]
    Consultation,
    Download,
    Newsletter,
    Demo,
}

// A full row of the blog_posts table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    #[sqlx(json)]
    pub target_keywords: Vec<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub views: i64,
    pub leads: i64,
    pub shares: i64,
    pub featured_image: Option<String>,
    pub author: String,
    pub cta_type: CtaType,
    pub reading_time: i64,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Title used in `<title>` and social tags.
    pub fn seo_title(&self) -> &str {
        self.meta_title.as_deref().unwrap_or(&self.title)
    }

    pub fn seo_description(&self) -> &str {
        self.meta_description
            .as_deref()
            .or(self.excerpt.as_deref())
            .unwrap_or("")
    }
}

// Body of POST /api/admin/blog-posts and /api/cms/posts.
// Required fields are optional here so that every missing one can be reported at once.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePostSchema {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    pub status: Option<PostStatus>,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub featured_image: Option<String>,
    pub author: Option<String>,
    pub cta_type: Option<CtaType>,
}

/// A create request that passed validation.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub target_keywords: Vec<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub featured_image: Option<String>,
    pub author: Option<String>,
    pub cta_type: CtaType,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl CreatePostSchema {
    pub fn validate(self) -> Result<NewPost, AppError> {
        let title = trimmed(self.title);
        let slug = trimmed(self.slug);
        let content = trimmed(self.content);
        let category = trimmed(self.category);

        let mut missing = Vec::new();
        if title.is_none() {
            missing.push("title");
        }
        if slug.is_none() {
            missing.push("slug");
        }
        if content.is_none() {
            missing.push("content");
        }
        if category.is_none() {
            missing.push("category");
        }

        let (Some(title), Some(slug), Some(content), Some(category)) = (title, slug, content, category)
        else {
            return Err(AppError::MissingFields(missing));
        };

        if !is_url_safe_slug(&slug) {
            return Err(AppError::Validation(format!(
                "Slug '{slug}' must be lowercase letters, digits and single hyphens"
            )));
        }
        check_seo_lengths(self.meta_title.as_deref(), self.meta_description.as_deref())?;

        Ok(NewPost {
            title,
            slug,
            content,
            category,
            excerpt: trimmed(self.excerpt),
            tags: normalize_list(self.tags),
            target_keywords: normalize_list(self.target_keywords),
            status: self.status.unwrap_or(PostStatus::Draft),
            published_at: self.published_at,
            meta_title: trimmed(self.meta_title),
            meta_description: trimmed(self.meta_description),
            canonical_url: trimmed(self.canonical_url),
            featured_image: trimmed(self.featured_image),
            author: trimmed(self.author),
            cta_type: self.cta_type.unwrap_or_default(),
        })
    }
}

// Body of PATCH. Counters are not part of it and unknown fields are rejected.
// Optional text fields distinguish a missing key (keep) from `null` (clear).
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePostSchema {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub excerpt: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub target_keywords: Option<Vec<String>>,
    pub status: Option<PostStatus>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub meta_title: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub meta_description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub canonical_url: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub featured_image: Option<Option<String>>,
    pub author: Option<String>,
    pub cta_type: Option<CtaType>,
}

impl UpdatePostSchema {
    /// Field-level checks that do not need the stored row.
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("title", &self.title),
            ("content", &self.content),
            ("category", &self.category),
            ("author", &self.author),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(AppError::Validation(format!("Field '{name}' cannot be empty")));
            }
        }
        if let Some(slug) = &self.slug {
            if !is_url_safe_slug(slug) {
                return Err(AppError::Validation(format!(
                    "Slug '{slug}' must be lowercase letters, digits and single hyphens"
                )));
            }
        }
        check_seo_lengths(
            self.meta_title.as_ref().and_then(|t| t.as_deref()).map(str::trim),
            self.meta_description.as_ref().and_then(|d| d.as_deref()).map(str::trim),
        )
    }
}

/// Resolves a nullable PATCH field against the stored value.
pub fn patch_text(change: Option<Option<String>>, current: Option<String>) -> Option<String> {
    match change {
        Some(value) => trimmed(value),
        None => current,
    }
}

pub fn check_seo_lengths(meta_title: Option<&str>, meta_description: Option<&str>) -> Result<(), AppError> {
    if let Some(t) = meta_title {
        let len = t.chars().count();
        if len > META_TITLE_MAX {
            return Err(AppError::Validation(format!(
                "metaTitle is {len} characters, the limit is {META_TITLE_MAX}"
            )));
        }
    }
    if let Some(d) = meta_description {
        let len = d.chars().count();
        if len > META_DESCRIPTION_MAX {
            return Err(AppError::Validation(format!(
                "metaDescription is {len} characters, the limit is {META_DESCRIPTION_MAX}"
            )));
        }
    }
    Ok(())
}

// Query string of the list endpoints (?category=...&tag=...&search=...)
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<PostStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TermCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub total_posts: i64,
    pub published: i64,
    pub drafts: i64,
    pub scheduled: i64,
    pub archived: i64,
    pub total_views: i64,
    pub total_leads: i64,
    pub total_shares: i64,
}

/// Shape of a post in the static JSON exports and the hydration payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPost {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    pub author: String,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: i64,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub cta_type: CtaType,
    pub url: String,
}

impl From<&BlogPost> for ClientPost {
    fn from(post: &BlogPost) -> Self {
        ClientPost {
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            target_keywords: post.target_keywords.clone(),
            author: post.author.clone(),
            published_at: post.published_at,
            reading_time: post.reading_time,
            featured_image: post.featured_image.clone(),
            meta_title: post.meta_title.clone(),
            meta_description: post.meta_description.clone(),
            canonical_url: post.canonical_url.clone(),
            cta_type: post.cta_type,
            url: format!("/blog/{}", post.slug),
        }
    }
}

impl From<ClientPost> for CreatePostSchema {
    fn from(post: ClientPost) -> Self {
        CreatePostSchema {
            title: Some(post.title),
            slug: Some(post.slug),
            content: Some(post.content),
            category: Some(post.category),
            excerpt: post.excerpt,
            tags: post.tags,
            target_keywords: post.target_keywords,
            status: Some(PostStatus::Published),
            published_at: post.published_at,
            meta_title: post.meta_title,
            meta_description: post.meta_description,
            canonical_url: post.canonical_url,
            featured_image: post.featured_image,
            author: Some(post.author),
            cta_type: Some(post.cta_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreatePostSchema {
        CreatePostSchema {
            title: Some("Test & Launch".into()),
            slug: Some("test-launch".into()),
            content: Some("Body".into()),
            category: Some("news".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let err = CreatePostSchema {
            title: Some("Only a title".into()),
            content: Some("   ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        match err {
            AppError::MissingFields(fields) => assert_eq!(fields, vec!["slug", "content", "category"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn defaults_apply_on_valid_input() {
        let post = valid().validate().unwrap();
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.cta_type, CtaType::Consultation);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn unsafe_slug_is_rejected() {
        let mut schema = valid();
        schema.slug = Some("Not A Slug".into());
        assert!(matches!(schema.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn seo_limits_are_enforced() {
        let mut schema = valid();
        schema.meta_title = Some("x".repeat(META_TITLE_MAX));
        schema.meta_description = Some("y".repeat(META_DESCRIPTION_MAX + 1));
        let err = schema.validate().unwrap_err();
        assert!(err.to_string().contains("metaDescription"));
    }

    #[test]
    fn update_rejects_counter_fields() {
        let parsed: Result<UpdatePostSchema, _> = serde_json::from_str(r#"{"views": 10}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn update_tells_null_from_missing() {
        let parsed: UpdatePostSchema =
            serde_json::from_str(r#"{"featuredImage": null, "excerpt": "  New  "}"#).unwrap();
        assert_eq!(parsed.featured_image, Some(None));
        assert_eq!(parsed.meta_title, None);

        let stored = Some("/uploads/a.png".to_string());
        assert_eq!(patch_text(parsed.featured_image, stored.clone()), None);
        assert_eq!(patch_text(parsed.meta_title, stored.clone()), stored);
        assert_eq!(patch_text(parsed.excerpt, None), Some("New".to_string()));
        assert_eq!(patch_text(Some(Some("   ".into())), stored), None);
    }

    #[test]
    fn status_uses_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&PostStatus::Scheduled).unwrap(), "\"scheduled\"");
        let cta: CtaType = serde_json::from_str("\"demo\"").unwrap();
        assert_eq!(cta, CtaType::Demo);
    }
}
