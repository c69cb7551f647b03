//! Development server with live reload via Server-Sent Events.
//!
//! Serves the output directory from disk, injects the reload client into
//! HTML documents and pushes a reload event to connected browsers whenever a
//! file matching the reload globs changes.

use crate::dev::{DevConfig, DevEvent, FileChange, FileWatcher, SharedState, fallback};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// SSE endpoint the reload client subscribes to.
pub const EVENTS_PATH: &str = "/__elmwatch__/events";

/// Reload client script.
pub const CLIENT_PATH: &str = "/__elmwatch__/reload.js";

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");

/// Repeated events for one output file within this window trigger one reload.
const RELOAD_COALESCE: Duration = Duration::from_millis(50);

/// Development server.
pub struct DevServer {
    /// Server configuration
    config: DevConfig,
    /// Shared application state
    state: SharedState,
}

impl DevServer {
    /// Create a new development server.
    ///
    /// # Arguments
    ///
    /// * `config` - Session configuration (address, server root, reload globs)
    /// * `state` - Shared state for client tracking
    pub fn new(config: DevConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Start the development server.
    ///
    /// Binds, then serves until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if [`DevServer::bind`] fails or serving stops with an
    /// I/O error
    pub async fn start(self) -> Result<()> {
        self.bind().await?.serve().await
    }

    /// Start the reload watcher and bind the configured address.
    ///
    /// Nothing is served until [`BoundServer::serve`] is awaited, so setup
    /// failures surface to the caller before the server task is spawned.
    ///
    /// # Errors
    ///
    /// Returns error if the reload watcher cannot be created or the server
    /// cannot bind to the configured address
    pub async fn bind(self) -> Result<BoundServer> {
        let addr = self.config.addr;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))
            .with_hint(format!(
                "Another process may be using port {}. Pick a different port with --port.",
                addr.port()
            ))?;

        let (watcher, changes) = FileWatcher::new(self.config.reload_watch_set()?, RELOAD_COALESCE)?;
        tokio::spawn(forward_reloads(watcher, changes, self.state.clone()));

        Ok(BoundServer {
            app: self.router(),
            listener,
            url: self.config.server_url(),
            state: self.state,
        })
    }

    /// Build the axum router for this server.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.base.history_fallback)
    }
}

/// A development server whose listener is bound and reload watcher running.
pub struct BoundServer {
    listener: tokio::net::TcpListener,
    app: Router,
    url: String,
    state: SharedState,
}

impl BoundServer {
    /// Address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns error if the socket address cannot be read
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the server stops with an I/O error
    pub async fn serve(self) -> Result<()> {
        ui::success(&format!(
            "Serving {} at {}",
            self.state.server_root().display(),
            self.url
        ));

        axum::serve(self.listener, self.app)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router with all routes.
///
/// Static files come from the state's server root; every other concern is a
/// layer around it.
pub fn build_router(state: SharedState, history_fallback: bool) -> Router {
    let mut router = Router::new()
        .route(EVENTS_PATH, get(handle_sse))
        .route(CLIENT_PATH, get(handle_reload_script))
        .fallback_service(ServeDir::new(state.server_root()))
        .layer(middleware::from_fn(inject_reload_client));

    if history_fallback {
        router = router.layer(middleware::from_fn(fallback::history_fallback));
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Broadcast a reload for every changed output file.
///
/// Owns the watcher so it lives as long as the forwarding task.
async fn forward_reloads(
    _watcher: FileWatcher,
    mut changes: mpsc::Receiver<FileChange>,
    state: SharedState,
) {
    while let Some(change) = changes.recv().await {
        let path = served_path(state.server_root(), change.path());
        tracing::debug!("{} {}", change.kind(), path);

        let clients = state.client_count();
        state.broadcast(&DevEvent::Reload { path: path.clone() }).await;

        if clients > 0 {
            ui::info(&format!("Reloading browsers ({})", path));
        }
    }
}

/// Path of a changed file as the browser sees it, relative to the server root.
fn served_path(server_root: &Path, path: &Path) -> String {
    match path.strip_prefix(server_root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

/// Handle SSE connections for reload events.
async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    tracing::debug!("reload client {} connected", id);

    state.send_to(id, &DevEvent::Connected { id }).await;

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Serve the reload client script.
async fn handle_reload_script(State(state): State<SharedState>) -> impl IntoResponse {
    let script = format!(
        "window.__ELMWATCH_NOTIFY__ = {};\n{}",
        state.notify, RELOAD_SCRIPT
    );

    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        script,
    )
}

/// Disable caching and add the reload client to HTML documents.
async fn inject_reload_client(req: Request, next: Next) -> Response {
    let is_head = req.method() == Method::HEAD;
    let mut response = next.run(req).await;

    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if is_head || response.status() != StatusCode::OK || !is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("failed to read HTML response: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read document").into_response();
        }
    };

    let html = inject_reload_script(&bytes);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// Inject the reload script tag into an HTML document.
///
/// Adds the tag before the closing </body> tag, or appends it when there is none.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);
    let script_tag = format!(r#"<script src="{}"></script>"#, CLIENT_PATH);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 4);
        result.push_str(&html[..pos]);
        result.push_str(&script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    let mut result = html.into_owned();
    result.push('\n');
    result.push_str(&script_tag);
    result.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TAG: &str = r#"<script src="/__elmwatch__/reload.js"></script>"#;

    #[test]
    fn test_inject_reload_script_with_body() {
        let html = b"<html><body><h1>Test</h1></body></html>";
        let result = String::from_utf8(inject_reload_script(html)).unwrap();

        let script_pos = result.find(TAG).unwrap();
        let body_pos = result.find("</body>").unwrap();
        assert!(script_pos < body_pos);
        assert!(result.starts_with("<html><body><h1>Test</h1>"));
    }

    #[test]
    fn test_inject_reload_script_uses_last_body_tag() {
        let html = b"<body><pre>&lt;/body&gt; </body></pre></body>";
        let result = String::from_utf8(inject_reload_script(html)).unwrap();
        assert!(result.ends_with(&format!("{}\n</body>", TAG)));
    }

    #[test]
    fn test_inject_reload_script_without_body() {
        let html = b"<h1>Test</h1>";
        let result = String::from_utf8(inject_reload_script(html)).unwrap();
        assert_eq!(result, format!("<h1>Test</h1>\n{}", TAG));
    }

    #[test]
    fn test_served_path_is_relative_to_root() {
        let root = PathBuf::from("/project/public");
        assert_eq!(served_path(&root, &root.join("main.js")), "main.js");
        assert_eq!(served_path(&root, &root.join("css").join("app.css")), "css/app.css");
    }

    #[test]
    fn test_served_path_outside_root_is_kept() {
        let root = PathBuf::from("/project/public");
        let outside = Path::new("/project/assets/x.js");
        assert_eq!(served_path(&root, outside), outside.display().to_string());
    }
}
