//! JSON file backend
//!
//! The whole collection is one pretty-printed array. Every mutation is a
//! read-modify-write under an in-process lock; the file is replaced through a
//! temp file + rename so readers never see half a document. Other processes
//! writing the same file are not coordinated.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{new_record, sort_newest_first, updated_record, BlogPost, BlogStore, NewBlogPost};
use crate::error::{MediSeekError, Result};

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored order (no sorting); a missing file is an empty store
    async fn load(&self) -> Result<Vec<BlogPost>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.read_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| self.read_error(e))
    }

    async fn save(&self, posts: &[BlogPost]) -> Result<()> {
        let body = serde_json::to_string_pretty(posts).map_err(|e| self.write_error(e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| self.write_error(e))?;
        file.write_all(body.as_bytes())
            .await
            .map_err(|e| self.write_error(e))?;
        file.sync_all().await.map_err(|e| self.write_error(e))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(self.write_error(e));
        }

        tracing::debug!(path = %self.path.display(), posts = posts.len(), "Blog file written");
        Ok(())
    }

    fn read_error(&self, e: impl std::fmt::Display) -> MediSeekError {
        MediSeekError::StoreRead {
            path: self.path.display().to_string(),
            details: e.to_string(),
        }
    }

    fn write_error(&self, e: impl std::fmt::Display) -> MediSeekError {
        MediSeekError::StoreWrite {
            path: self.path.display().to_string(),
            details: e.to_string(),
        }
    }
}

#[async_trait]
impl BlogStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn list_all(&self) -> Result<Vec<BlogPost>> {
        let mut posts = self.load().await?;
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        Ok(self.load().await?.into_iter().find(|p| p.slug == slug))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<BlogPost>> {
        Ok(self.load().await?.into_iter().find(|p| p.id == id))
    }

    async fn create(&self, post: NewBlogPost) -> Result<BlogPost> {
        let _guard = self.write_lock.lock().await;
        let mut posts = self.load().await?;

        let record = new_record(post, &posts, Utc::now());
        posts.insert(0, record.clone());
        self.save(&posts).await?;

        tracing::info!(post_id = %record.id, slug = %record.slug, "Blog post created");
        Ok(record)
    }

    async fn update(&self, id: &str, post: NewBlogPost) -> Result<Option<BlogPost>> {
        let _guard = self.write_lock.lock().await;
        let mut posts = self.load().await?;

        let Some(index) = posts.iter().position(|p| p.id == id) else {
            tracing::warn!(post_id = %id, "Blog post not found for update");
            return Ok(None);
        };

        let record = {
            let others: Vec<&BlogPost> = posts.iter().filter(|p| p.id != id).collect();
            updated_record(&posts[index], post, &others)
        };
        posts[index] = record.clone();
        self.save(&posts).await?;

        tracing::info!(post_id = %record.id, slug = %record.slug, "Blog post updated");
        Ok(Some(record))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut posts = self.load().await?;

        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            tracing::warn!(post_id = %id, "Blog post not found for deletion");
            return Ok(false);
        }

        self.save(&posts).await?;
        tracing::info!(post_id = %id, "Blog post deleted");
        Ok(true)
    }
}
