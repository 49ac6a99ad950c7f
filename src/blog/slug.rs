use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_-]+").unwrap());
static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").unwrap());

/// Fallback when a title has no sluggable characters
const EMPTY_SLUG: &str = "post";

/// URL slug for a title
pub fn slugify(title: &str) -> String {
    let lowercase = title.to_lowercase();
    let dashed = WHITESPACE.replace_all(&lowercase, "-");
    let stripped = NON_SLUG.replace_all(&dashed, "");
    let collapsed = DASH_RUNS.replace_all(&stripped, "-");
    let slug = collapsed.trim_matches('-');
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// First free slug among `base`, `base-1`, `base-2`, ...
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn basic_titles() {
        assert_eq!(slugify("My Title"), "my-title");
        assert_eq!(slugify("  Hello,   World! "), "hello-world");
        assert_eq!(slugify("Cold & Flu -- Tips"), "cold-flu-tips");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn non_ascii_is_dropped() {
        assert_eq!(slugify("Café Santé"), "caf-sant");
        assert_eq!(slugify("健康"), "post");
        assert_eq!(slugify("---"), "post");
    }

    #[test]
    fn unique_suffixes() {
        let existing = ["my-title", "my-title-1"];
        assert_eq!(unique_slug("my-title", |s| existing.contains(&s)), "my-title-2");
        assert_eq!(unique_slug("other", |s| existing.contains(&s)), "other");
    }

    proptest! {
        #[test]
        fn slug_alphabet_and_shape(title in ".{0,80}") {
            let slug = slugify(&title);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn slugify_is_idempotent(title in "[A-Za-z0-9 _-]{1,40}") {
            let once = slugify(&title);
            prop_assert_eq!(slugify(&once), once);
        }
    }
}
