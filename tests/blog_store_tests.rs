//! JSON file blog store, exercised through the public trait

use std::fs;

use mediseek::blog::{BlogStore, JsonFileStore, NewBlogPost};
use tempfile::TempDir;

fn post(title: &str) -> NewBlogPost {
    NewBlogPost {
        title: title.to_string(),
        content: "Body text that is comfortably longer than the minimum.".to_string(),
        ..Default::default()
    }
}

fn store(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("data").join("blogs.json"))
}

#[tokio::test]
async fn posts_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let created = store(&dir).create(post("First Post")).await.unwrap();

    let reopened = store(&dir);
    let found = reopened.get_by_slug("first-post").await.unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(reopened.get_by_id(&created.id).await.unwrap(), Some(created));
}

#[tokio::test]
async fn list_is_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.create(post("Older Post")).await.unwrap();
    store.create(post("Newer Post")).await.unwrap();

    let titles: Vec<String> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["Newer Post", "Older Post"]);
}

#[tokio::test]
async fn deleting_unknown_id_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.create(post("Keep Me")).await.unwrap();
    let before = fs::read(store.path()).unwrap();

    assert!(!store.delete("no-such-id").await.unwrap());

    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[tokio::test]
async fn retitling_takes_a_free_slug() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.create(post("Taken Title")).await.unwrap();
    let other = store.create(post("Something Else")).await.unwrap();

    let updated = store
        .update(&other.id, post("Taken Title"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.slug, "taken-title-1");

    // Same title again keeps the slug it already has
    let again = store
        .update(&other.id, post("Taken Title"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.slug, "taken-title-1");
}

#[tokio::test]
async fn excerpt_and_author_defaults() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let long_body = "word ".repeat(100);
    let created = store
        .create(NewBlogPost {
            title: "Long Read".to_string(),
            content: long_body,
            author: None,
            excerpt: None,
        })
        .await
        .unwrap();

    assert_eq!(created.author, "Admin");
    let excerpt = created.excerpt.unwrap();
    assert!(excerpt.ends_with("..."));
    assert!(excerpt.chars().count() <= 153);
}

#[tokio::test]
async fn hand_edited_file_with_missing_excerpt_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blogs.json");
    fs::write(
        &path,
        r#"[{
            "id": "abc",
            "slug": "hand-written",
            "title": "Hand Written",
            "author": "Editor",
            "date": "2024-05-01T10:00:00Z",
            "content": "Written outside the app."
        }]"#,
    )
    .unwrap();

    let store = JsonFileStore::new(&path);
    let posts = store.list_all().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author, "Editor");
    assert!(posts[0].excerpt.is_none());
}
