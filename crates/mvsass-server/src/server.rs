//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tower_http::services::ServeDir;

use mvsass_example::{ExampleCompiler, ExampleConfig};

use crate::listing::{render_listing, resolve};
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Directory served over HTTP
    pub root: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Page opened in the browser, relative to the root
    pub open_path: String,

    /// Recompile examples when their sources change
    pub watch: bool,

    /// Example pipeline run on changes
    pub example: ExampleConfig,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("examples"),
            port: 8000,
            host: "127.0.0.1".to_string(),
            open: true,
            open_path: "html/index.html".to_string(),
            watch: true,
            example: ExampleConfig::default(),
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Address the server will bind to.
    pub fn address(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        addr.parse().map_err(|_| ServerError::InvalidAddress(addr))
    }

    /// Router serving the root directory with directory listings.
    pub fn router(&self) -> Router {
        let root = Arc::new(self.config.root.clone());
        let listing: MethodRouter = get(listing_handler).with_state(root);

        Router::new().fallback_service(ServeDir::new(&self.config.root).fallback(listing))
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        if !self.config.root.is_dir() {
            return Err(ServerError::RootNotFound(self.config.root.clone()));
        }

        let addr = self.address()?;

        if self.config.watch {
            self.spawn_watcher()?;
        }

        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!(
            "Serving {} at http://{}",
            self.config.root.display(),
            addr
        );

        if self.config.open {
            let url = format!(
                "http://{}/{}",
                addr,
                self.config.open_path.trim_start_matches('/')
            );
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }

    /// Watch the example sources and recompile on change.
    fn spawn_watcher(&self) -> Result<(), ServerError> {
        let example = self.config.example.clone();

        let mut watch_paths = vec![example.sass_dir.clone()];
        watch_paths.extend(example.load_paths.iter().cloned());

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        tracing::info!("Watching {} for changes", example.sass_dir.display());

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&example, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        Ok(())
    }
}

/// Handle file watch events.
async fn handle_watch_event(example: &ExampleConfig, event: WatchEvent) {
    if !event.affects_stylesheets() {
        tracing::debug!("Ignoring change to {}", event.path().display());
        return;
    }

    tracing::info!("Stylesheet changed: {}", event.path().display());

    let compiler = ExampleCompiler::new(example.clone());
    match tokio::task::spawn_blocking(move || compiler.compile_all()).await {
        Ok(Ok(sheets)) => tracing::info!("Rebuilt {} example stylesheets", sheets.len()),
        Ok(Err(e)) => tracing::error!("Example build failed: {}", e),
        Err(e) => tracing::error!("Example build task failed: {}", e),
    }
}

/// Handler rendering listings for directories without an index page.
async fn listing_handler(State(root): State<Arc<PathBuf>>, uri: Uri) -> Response {
    let request_path = uri.path();

    let Some(path) = resolve(&root, request_path) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    if !path.is_dir() {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match render_listing(&path, request_path) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to list {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to list directory").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn fetch(router: Router, path: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            path
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 8000);
        assert_eq!(server.address().unwrap().port(), 8000);
    }

    #[test]
    fn rejects_invalid_host() {
        let server = DevServer::new(DevServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            server.address(),
            Err(ServerError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn serves_files() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("base/css")).unwrap();
        fs::write(temp.path().join("base/css/main.css"), ".a{color:red}").unwrap();

        let server = DevServer::new(DevServerConfig {
            root: temp.path().to_path_buf(),
            ..Default::default()
        });

        let response = fetch(server.router(), "/base/css/main.css").await;

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(".a{color:red}"));
    }

    #[tokio::test]
    async fn lists_directories_without_index() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("base/css")).unwrap();
        fs::write(temp.path().join("base/css/main.css"), "").unwrap();

        let server = DevServer::new(DevServerConfig {
            root: temp.path().to_path_buf(),
            ..Default::default()
        });

        let response = fetch(server.router(), "/base/css/").await;

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("Index of /base/css/"));
        assert!(response.contains("main.css"));
    }

    #[tokio::test]
    async fn start_fails_without_root() {
        let temp = tempdir().unwrap();
        let server = DevServer::new(DevServerConfig {
            root: temp.path().join("missing"),
            open: false,
            watch: false,
            ..Default::default()
        });

        assert!(matches!(
            server.start().await,
            Err(ServerError::RootNotFound(_))
        ));
    }
}
