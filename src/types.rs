//! Shared types returned by the scanner and serialized by the endpoint.
//!
//! The JSON shape is consumed directly by the gallery front-end, so field
//! names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// One gallery folder: a direct subdirectory of the uploads root.
///
/// `cover_image` is either empty or one of `images`. `images` keeps the
/// order the filesystem enumerated the directory in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Directory basename
    pub name: String,
    /// Site-relative path of the largest image, or `""` when there is none
    pub cover_image: String,
    /// Site-relative paths of every qualifying image
    pub images: Vec<String>,
}

impl Folder {
    pub fn has_cover(&self) -> bool {
        !self.cover_image.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let folder = Folder {
            name: "summer".to_string(),
            cover_image: "/uploads/summer/a.jpg".to_string(),
            images: vec!["/uploads/summer/a.jpg".to_string()],
        };
        let json = serde_json::to_value(&folder).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "summer",
                "coverImage": "/uploads/summer/a.jpg",
                "images": ["/uploads/summer/a.jpg"],
            })
        );
    }

    #[test]
    fn empty_cover_is_serialized_as_empty_string() {
        let folder = Folder {
            name: "empty".to_string(),
            cover_image: String::new(),
            images: vec![],
        };
        let json = serde_json::to_string(&folder).unwrap();
        assert_eq!(json, r#"{"name":"empty","coverImage":"","images":[]}"#);
        assert!(!folder.has_cover());
    }
}
