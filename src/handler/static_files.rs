//! Static file serving module
//!
//! Maps URL prefixes to directories, resolves request paths inside them and
//! loads the file bytes. A file is read completely before any header is
//! produced, so a failed read becomes a clean 500 instead of a truncated 200.

use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Invoked after a file from the mount has been served successfully
pub type MountCallback = Arc<dyn Fn() + Send + Sync>;

/// URL prefix bound to a filesystem directory
#[derive(Clone)]
pub struct StaticMount {
    url_prefix: String,
    root: PathBuf,
    callback: Option<MountCallback>,
}

impl fmt::Debug for StaticMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticMount")
            .field("url_prefix", &self.url_prefix)
            .field("root", &self.root)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl StaticMount {
    pub fn new(
        url_prefix: impl Into<String>,
        root: impl Into<PathBuf>,
        callback: Option<MountCallback>,
    ) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            root: root.into(),
            callback,
        }
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File location for `path`, if the path falls under this mount's prefix
    fn candidate(&self, path: &str) -> Option<PathBuf> {
        let remainder = path.strip_prefix(self.url_prefix.as_str())?;
        Some(self.root.join(remainder.trim_start_matches('/')))
    }
}

/// A request path resolved to an existing regular file
#[derive(Debug)]
pub struct StaticHit<'a> {
    pub mount: &'a StaticMount,
    pub file: PathBuf,
    pub content_type: &'static str,
}

/// Find the first mount, in registration order, that holds a regular file
/// for `path`.
///
/// Paths escaping the mount root (via `..` or symlinks) are rejected.
pub async fn resolve<'a>(mounts: &'a [StaticMount], path: &str) -> Option<StaticHit<'a>> {
    for mount in mounts {
        let Some(file) = mount.candidate(path) else {
            continue;
        };

        // Not found is the common case, no need to log it
        let Ok(metadata) = fs::metadata(&file).await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        if !is_within_root(mount.root(), &file).await {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {path} -> {}",
                file.display()
            ));
            continue;
        }

        let content_type = mime::content_type_for_path(&file);
        return Some(StaticHit {
            mount,
            file,
            content_type,
        });
    }
    None
}

async fn is_within_root(root: &Path, file: &Path) -> bool {
    let (Ok(root), Ok(file)) = (fs::canonicalize(root).await, fs::canonicalize(file).await)
    else {
        return false;
    };
    file.starts_with(root)
}

/// Load a resolved file and build the response.
///
/// On success the mount callback runs; a read failure yields a 500.
pub async fn serve(hit: &StaticHit<'_>, request_path: &str) -> Response<Full<Bytes>> {
    match fs::read(&hit.file).await {
        Ok(content) => {
            logger::log_static_served(request_path, &hit.file, content.len());
            let response = http::build_file_response(Bytes::from(content), hit.content_type);
            if let Some(callback) = &hit.mount.callback {
                callback();
            }
            response
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read static file '{}': {e}",
                hit.file.display()
            ));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fresh directory under the system temp dir
    pub(crate) fn temp_dir(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "rust_router_{name}_{}_{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_resolve_file_under_prefix() {
        let root = temp_dir("resolve");
        std::fs::create_dir_all(root.join("css")).unwrap();
        std::fs::write(root.join("css/site.css"), "body{}").unwrap();

        let mounts = vec![StaticMount::new("/public", &root, None)];
        let hit = resolve(&mounts, "/public/css/site.css").await.unwrap();
        assert_eq!(hit.file, root.join("css/site.css"));
        assert_eq!(hit.content_type, "text/css");
        assert_eq!(hit.mount.url_prefix(), "/public");
    }

    #[tokio::test]
    async fn test_resolve_declines() {
        let root = temp_dir("declines");
        std::fs::create_dir_all(root.join("img")).unwrap();
        std::fs::write(root.join("a.txt"), "a").unwrap();
        let mounts = vec![StaticMount::new("/public", &root, None)];

        // wrong prefix, missing file, directory, mount root itself
        assert!(resolve(&mounts, "/other/a.txt").await.is_none());
        assert!(resolve(&mounts, "/public/missing.txt").await.is_none());
        assert!(resolve(&mounts, "/public/img").await.is_none());
        assert!(resolve(&mounts, "/public").await.is_none());
    }

    #[tokio::test]
    async fn test_first_mount_with_file_wins() {
        let first = temp_dir("first");
        let second = temp_dir("second");
        std::fs::write(first.join("shared.txt"), "first").unwrap();
        std::fs::write(second.join("shared.txt"), "second").unwrap();
        std::fs::write(second.join("only.txt"), "second only").unwrap();

        let mounts = vec![
            StaticMount::new("/static", &first, None),
            StaticMount::new("/static", &second, None),
        ];
        let hit = resolve(&mounts, "/static/shared.txt").await.unwrap();
        assert_eq!(hit.file, first.join("shared.txt"));

        // first mount's prefix matches but it has no such file
        let hit = resolve(&mounts, "/static/only.txt").await.unwrap();
        assert_eq!(hit.file, second.join("only.txt"));
    }

    #[tokio::test]
    async fn test_traversal_outside_root_rejected() {
        let base = temp_dir("traversal");
        let root = base.join("public");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(base.join("secret.txt"), "secret").unwrap();

        let mounts = vec![StaticMount::new("/public", &root, None)];
        assert!(resolve(&mounts, "/public/../secret.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_serve_runs_callback() {
        let root = temp_dir("callback");
        std::fs::write(root.join("app.js"), "console.log(1)").unwrap();
        let served = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&served);
        let callback: MountCallback = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mounts = vec![StaticMount::new("/js", &root, Some(callback))];
        let hit = resolve(&mounts, "/js/app.js").await.unwrap();
        let response = serve(&hit, "/js/app.js").await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/javascript");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"console.log(1)");
        assert_eq!(served.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_file_removed_after_resolve_yields_500() {
        let root = temp_dir("vanishing");
        std::fs::write(root.join("gone.html"), "<p>soon gone</p>").unwrap();
        let served = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&served);
        let callback: MountCallback = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mounts = vec![StaticMount::new("/public", &root, Some(callback))];
        let hit = resolve(&mounts, "/public/gone.html").await.unwrap();
        std::fs::remove_file(root.join("gone.html")).unwrap();

        let response = serve(&hit, "/public/gone.html").await;
        assert_eq!(response.status(), 500);
        assert_eq!(response.headers()["content-type"], "text/plain");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), http::response::INTERNAL_ERROR_BODY.as_bytes());
        assert_eq!(served.load(Ordering::SeqCst), 0);
    }
}
