//! `GET /api/gallery/folders` — the folder index as JSON.
//!
//! Only `GET` is accepted. Scan failures are logged in full and reported to
//! the client as an opaque 500; the response never carries a partial list or
//! any filesystem path.

use crate::http::{Method, Response, Status};
use crate::scan::{self, ScanError};
use std::path::Path;
use thiserror::Error;

pub const FOLDERS_ROUTE: &str = "/api/gallery/folders";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("method {0} not allowed")]
    UnsupportedMethod(Method),
    #[error("scan failed: {0}")]
    ScanFailure(#[from] ScanError),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::UnsupportedMethod(_) => Status::MethodNotAllowed,
            ApiError::ScanFailure(_) => Status::InternalServerError,
        }
    }

    /// Client-facing message. Never includes error detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::UnsupportedMethod(_) => "Method not allowed",
            ApiError::ScanFailure(_) => "Error reading folders",
        }
    }

    pub fn into_response(self) -> Response {
        let response = Response::message(self.status(), self.public_message());
        match self {
            ApiError::UnsupportedMethod(_) => response.with_header("Allow", "GET"),
            ApiError::ScanFailure(_) => response,
        }
    }
}

/// Handle a request to [`FOLDERS_ROUTE`].
pub fn folders(method: &Method, uploads_dir: &Path, url_prefix: &str) -> Response {
    match list_folders(method, uploads_dir, url_prefix) {
        Ok(response) => response,
        Err(err) => {
            if let ApiError::ScanFailure(scan_err) = &err {
                tracing::error!(
                    error = %scan_err,
                    path = %scan_err.path().display(),
                    "Error reading folders"
                );
            }
            err.into_response()
        }
    }
}

fn list_folders(method: &Method, uploads_dir: &Path, url_prefix: &str) -> Result<Response, ApiError> {
    if *method != Method::Get {
        return Err(ApiError::UnsupportedMethod(method.clone()));
    }
    let index = scan::scan_folders(uploads_dir, url_prefix)?;
    Ok(Response::json(Status::Ok, &index))
}
