/// Words per minute used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

/// Lowercase, non-alphanumeric runs collapsed to one hyphen, no leading or trailing hyphen.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut prev_hyphen = false;

    for ch in input.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    while slug.starts_with('-') {
        slug.remove(0);
    }

    slug
}

pub fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// Drops markup so that only visible text is counted.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    out
}

pub fn word_count(body: &str) -> usize {
    strip_tags(body).split_whitespace().count()
}

/// Lowercased title, excerpt and content joined by a unit separator, stored for search.
pub fn search_text(title: &str, excerpt: Option<&str>, content: &str) -> String {
    [title, excerpt.unwrap_or(""), content].join("\u{1f}").to_lowercase()
}

/// Minutes to read `body`, never less than one.
pub fn reading_time(body: &str) -> i64 {
    let words = word_count(body);
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i64
}

/// Trims entries, drops empty ones and keeps the first occurrence of duplicates.
pub fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
