use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

// 1. StorageService Contract
/// StorageService
///
/// Abstract contract for the image storage layer. The disk-backed implementation
/// (LocalImageStore) serves the running application; the in-memory Mock stands in
/// during tests so handlers can be exercised without touching the filesystem.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the image directory exists. Called once at startup; no-op if the
    /// directory is already there.
    async fn ensure_image_dir(&self);

    /// Persists an uploaded image under its original (sanitized) filename and
    /// returns the public path where it can be referenced.
    async fn store_image(&self, filename: &str, bytes: &[u8]) -> Result<String, String>;
}

/// is_allowed_image
///
/// Upload filter: only jpg, jpeg, png and gif files are accepted, decided by
/// file extension (case-insensitive).
pub fn is_allowed_image(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    ["jpg", "jpeg", "png", "gif"]
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// sanitize_filename
///
/// Prevents path traversal by keeping only the final path component and dropping
/// `.`/`..` segments from a client-supplied filename.
fn sanitize_filename(filename: &str) -> String {
    filename
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .next_back()
        .unwrap_or("upload.bin")
        .to_string()
}

// 2. The Real Implementation (local disk)
/// LocalImageStore
///
/// Writes uploaded images to a directory on the application server, keeping the
/// client's filename so existing references remain stable.
#[derive(Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }
}

#[async_trait]
impl StorageService for LocalImageStore {
    async fn ensure_image_dir(&self) {
        let _ = tokio::fs::create_dir_all(&self.root).await;
    }

    async fn store_image(&self, filename: &str, bytes: &[u8]) -> Result<String, String> {
        let safe_name = sanitize_filename(filename);
        let dest = self.root.join(&safe_name);

        tokio::fs::write(&dest, bytes)
            .await
            .map_err(|e| e.to_string())?;

        Ok(dest.to_string_lossy().into_owned())
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockStorageService
///
/// Test double for `StorageService`. Records nothing; returns a deterministic
/// path, or a simulated failure when constructed with `new_failing`.
#[derive(Clone)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockStorageService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_image_dir(&self) {
        // No-op in mock environment.
    }

    async fn store_image(&self, filename: &str, _bytes: &[u8]) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }
        Ok(format!("public/images/{}", sanitize_filename(filename)))
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
