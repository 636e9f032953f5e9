//! Thread-per-connection HTTP server.
//!
//! Routes:
//!
//! | Path | Handler |
//! |------|---------|
//! | `/api/gallery/folders` | [`api::folders`] |
//! | `<url_prefix>/<folder>/<file>` | image bytes from `uploads_dir` (`GET`/`HEAD`) |
//! | anything else | `404 {"message":"Not found"}` |
//!
//! Each accepted connection is handled on its own thread, serves exactly one
//! request, and is closed. The configured timeout bounds both socket reads
//! and socket writes.

use crate::api::{self, FOLDERS_ROUTE};
use crate::config::GalleryConfig;
use crate::http::{HttpError, Method, Request, Response, Status};
use crate::scan;
use percent_encoding::percent_decode_str;
use std::fs;
use std::io::{self, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Maps a parsed request to a response. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct Router {
    uploads_dir: PathBuf,
    url_prefix: String,
}

impl Router {
    pub fn new(uploads_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn from_config(config: &GalleryConfig) -> Self {
        Self::new(&config.uploads_dir, &config.url_prefix)
    }

    pub fn handle(&self, request: &Request) -> Response {
        let path = request.path();
        if path == FOLDERS_ROUTE {
            return api::folders(&request.method, &self.uploads_dir, &self.url_prefix);
        }
        if let Some(rest) = path
            .strip_prefix(self.url_prefix.as_str())
            .and_then(|r| r.strip_prefix('/'))
        {
            return self.serve_upload(&request.method, rest);
        }
        not_found()
    }

    /// Serve `<folder>/<file>` from the uploads root. Only paths the folder
    /// index could have produced are reachable.
    fn serve_upload(&self, method: &Method, rest: &str) -> Response {
        if !matches!(method, Method::Get | Method::Head) {
            return Response::message(Status::MethodNotAllowed, "Method not allowed")
                .with_header("Allow", "GET, HEAD");
        }
        for rel in upload_candidates(rest) {
            let file_path = self.uploads_dir.join(&rel);
            match fs::metadata(&file_path) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return file_error(&file_path, e),
            }
            return match fs::read(&file_path) {
                Ok(body) => Response::new(Status::Ok, content_type(&file_path), body),
                Err(e) => file_error(&file_path, e),
            };
        }
        not_found()
    }
}

fn not_found() -> Response {
    Response::message(Status::NotFound, "Not found")
}

fn file_error(path: &Path, e: io::Error) -> Response {
    tracing::error!(path = %path.display(), error = %e, "Error reading upload");
    Response::message(Status::InternalServerError, "Error reading file")
}

/// Files `<folder>/<file>` may refer to, in lookup order.
///
/// The index lists raw file names, so the segments as sent come first; the
/// percent-decoded form (what a browser sends for a name with spaces) comes
/// second. Malformed escapes are left as-is. A candidate is dropped unless it
/// is exactly two plain segments, its folder is not dot-prefixed, and its file
/// has a gallery image extension.
fn upload_candidates(rest: &str) -> Vec<PathBuf> {
    let Some((folder, file)) = rest.split_once('/') else {
        return Vec::new();
    };
    let raw = (folder.to_string(), file.to_string());
    let decoded = (decode_segment(folder), decode_segment(file));

    let mut candidates = Vec::new();
    for (folder, file) in [raw, decoded] {
        if folder.starts_with('.') || !is_single_component(&folder) || !is_single_component(&file) {
            continue;
        }
        if !scan::is_qualifying_image(&file) {
            continue;
        }
        let rel = Path::new(&folder).join(&file);
        if !candidates.contains(&rel) {
            candidates.push(rel);
        }
    }
    candidates
}

/// Percent-decode one path segment, keeping the input when it is not UTF-8.
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn is_single_component(segment: &str) -> bool {
    if segment.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// A bound listener plus the router it dispatches to.
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    io_timeout: Duration,
}

impl Server {
    pub fn bind(config: &GalleryConfig) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(&config.server.bind).map_err(|source| ServerError::Bind {
                addr: config.server.bind.clone(),
                source,
            })?;
        Ok(Self {
            listener,
            router: Arc::new(Router::from_config(config)),
            io_timeout: config.server.read_timeout(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails. Accept errors on a single
    /// connection are logged and skipped.
    pub fn run(self) -> Result<(), ServerError> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let io_timeout = self.io_timeout;
                    thread::spawn(move || handle_connection(stream, &router, io_timeout));
                }
                Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
            }
        }
        Ok(())
    }
}

fn handle_connection(stream: TcpStream, router: &Router, timeout: Duration) {
    let started = Instant::now();
    if let Err(e) = stream.set_read_timeout(Some(timeout)) {
        tracing::warn!(error = %e, "failed to set read timeout");
    }
    // A client that stops reading must not pin the thread.
    if let Err(e) = stream.set_write_timeout(Some(timeout)) {
        tracing::warn!(error = %e, "failed to set write timeout");
    }

    let mut reader = BufReader::new(&stream);
    let (request, response) = match Request::read_from(&mut reader) {
        Ok(request) => {
            let response = router.handle(&request);
            (Some(request), response)
        }
        Err(HttpError::Empty) => return,
        Err(HttpError::Io(e)) => {
            tracing::debug!(error = %e, "connection dropped while reading request");
            return;
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejecting malformed request");
            (None, Response::message(Status::BadRequest, "Bad request"))
        }
    };

    let include_body = request.as_ref().is_none_or(|r| r.method != Method::Head);
    let mut writer = &stream;
    if let Err(e) = response.write_to(&mut writer, include_body) {
        tracing::debug!(error = %e, "failed to write response");
    }

    let (method, path) = request
        .as_ref()
        .map(|r| (r.method.as_str(), r.path()))
        .unwrap_or(("-", "-"));
    tracing::info!(
        method,
        path,
        status = response.status.code(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
}
