//! # Blog Store
//!
//! Posts written from the admin area and read by the public blog.
//!
//! - [`BlogStore`] - async persistence trait
//! - [`JsonFileStore`] - pretty-printed JSON array on disk
//!
//! The record rules (slugs, excerpts, author defaults) live here so every
//! store applies them the same way.

mod file;
mod slug;

pub use file::JsonFileStore;
pub use slug::{slugify, unique_slug};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Author used when none is given
pub const DEFAULT_AUTHOR: &str = "Admin";

/// Characters of content kept in a generated excerpt
pub const EXCERPT_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

/// Fields an admin submits for a new or edited post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBlogPost {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// All posts, newest first
    async fn list_all(&self) -> Result<Vec<BlogPost>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<BlogPost>>;

    async fn create(&self, post: NewBlogPost) -> Result<BlogPost>;

    /// `None` when no post has this id
    async fn update(&self, id: &str, post: NewBlogPost) -> Result<Option<BlogPost>>;

    /// Whether a post was removed
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// First [`EXCERPT_CHARS`] characters, with `...` when truncated
pub fn make_excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Build a new record; `existing` is consulted for slug uniqueness
pub(crate) fn new_record(post: NewBlogPost, existing: &[BlogPost], now: DateTime<Utc>) -> BlogPost {
    let slug = unique_slug(&slugify(&post.title), |s| existing.iter().any(|p| p.slug == s));
    let excerpt = post.excerpt.unwrap_or_else(|| make_excerpt(&post.content));

    BlogPost {
        id: uuid::Uuid::new_v4().to_string(),
        slug,
        title: post.title,
        author: post.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        date: now,
        content: post.content,
        excerpt: Some(excerpt),
    }
}

/// Apply an edit to `original`; `others` excludes the edited post
pub(crate) fn updated_record(original: &BlogPost, post: NewBlogPost, others: &[&BlogPost]) -> BlogPost {
    let slug = if post.title != original.title {
        unique_slug(&slugify(&post.title), |s| others.iter().any(|p| p.slug == s))
    } else {
        original.slug.clone()
    };

    let content_changed = post.content != original.content;
    let excerpt = match post.excerpt {
        Some(given) => Some(given),
        None if content_changed || original.excerpt.is_none() => Some(make_excerpt(&post.content)),
        None => original.excerpt.clone(),
    };

    let author = post
        .author
        .or_else(|| Some(original.author.clone()).filter(|a| !a.is_empty()))
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    BlogPost {
        id: original.id.clone(),
        slug,
        title: post.title,
        author,
        date: original.date,
        content: post.content,
        excerpt,
    }
}

/// Newest first
pub(crate) fn sort_newest_first(posts: &mut [BlogPost]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_post(title: &str, content: &str) -> NewBlogPost {
        NewBlogPost {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn excerpt_truncates_at_150_chars() {
        let short = "a".repeat(150);
        assert_eq!(make_excerpt(&short), short);

        let long = "é".repeat(151);
        let excerpt = make_excerpt(&long);
        assert_eq!(excerpt, format!("{}...", "é".repeat(150)));
    }

    #[test]
    fn new_record_defaults() {
        let post = new_record(new_post("My Title", "Body text long enough"), &[], at(10));
        assert_eq!(post.slug, "my-title");
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.excerpt.as_deref(), Some("Body text long enough"));
        assert_eq!(post.date, at(10));
        assert!(uuid::Uuid::parse_str(&post.id).is_ok());
    }

    #[test]
    fn new_record_dedups_slug() {
        let first = new_record(new_post("My Title", "c"), &[], at(1));
        let second = new_record(new_post("My Title", "c"), &[first.clone()], at(2));
        let third = new_record(new_post("My  title", "c"), &[first, second.clone()], at(3));
        assert_eq!(second.slug, "my-title-1");
        assert_eq!(third.slug, "my-title-2");
    }

    #[test]
    fn update_keeps_slug_when_title_unchanged() {
        let original = new_record(new_post("Same", "old content"), &[], at(1));
        let mut edit = new_post("Same", "old content");
        edit.author = Some("Dr. Rao".into());

        let updated = updated_record(&original, edit, &[]);
        assert_eq!(updated.slug, original.slug);
        assert_eq!(updated.author, "Dr. Rao");
        assert_eq!(updated.excerpt, original.excerpt);
        assert_eq!(updated.date, original.date);
    }

    #[test]
    fn update_reslugs_against_other_posts() {
        let taken = new_record(new_post("New Name", "x"), &[], at(1));
        let original = new_record(new_post("Old Name", "x"), &[taken.clone()], at(2));

        let updated = updated_record(&original, new_post("New Name", "x"), &[&taken]);
        assert_eq!(updated.slug, "new-name-1");
        assert_eq!(updated.id, original.id);
    }

    #[test]
    fn update_regenerates_excerpt_when_content_changes() {
        let mut create = new_post("T", "first body");
        create.excerpt = Some("custom".into());
        let original = new_record(create, &[], at(1));

        let updated = updated_record(&original, new_post("T", "second body"), &[]);
        assert_eq!(updated.excerpt.as_deref(), Some("second body"));

        let unchanged = updated_record(&original, new_post("T", "first body"), &[]);
        assert_eq!(unchanged.excerpt.as_deref(), Some("custom"));
    }

    #[test]
    fn update_author_falls_back() {
        let mut original = new_record(new_post("T", "c"), &[], at(1));
        original.author = "Jane".into();
        assert_eq!(updated_record(&original, new_post("T", "c"), &[]).author, "Jane");

        original.author = String::new();
        assert_eq!(updated_record(&original, new_post("T", "c"), &[]).author, DEFAULT_AUTHOR);
    }

    #[test]
    fn sorting_is_newest_first() {
        let mut posts = vec![
            new_record(new_post("a", "c"), &[], at(1)),
            new_record(new_post("b", "c"), &[], at(3)),
            new_record(new_post("c", "c"), &[], at(2)),
        ];
        sort_newest_first(&mut posts);
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["b", "c", "a"]);
    }
}
