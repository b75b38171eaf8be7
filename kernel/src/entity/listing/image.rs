use std::fmt::{Debug, Formatter};

use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln, References};

use crate::entity::{ListingId, UserId};

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

/// Object path inside the image bucket: `{owner}/{listing}/{file}`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Fromln, AsRefln)]
pub struct ImagePath(String);

impl ImagePath {
    pub fn new(owner: &UserId, listing: &ListingId, file_name: &str) -> Self {
        Self(format!("{owner}/{listing}/{file_name}"))
    }

    /// Prefix covering every image stored for the listing.
    pub fn prefix(owner: &UserId, listing: &ListingId) -> Self {
        Self(format!("{owner}/{listing}"))
    }
}

#[derive(Clone, References, Destructure)]
pub struct ImageFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension taken from the uploaded file name, `bin` when absent.
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or("bin")
    }
}

impl Debug for ImageFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use crate::entity::{ImageFile, ImagePath, ListingId, UserId};

    #[test]
    fn path_is_scoped_by_owner_and_listing() {
        let owner = UserId::new(Uuid::nil());
        let listing = ListingId::new(Uuid::nil());
        let path = ImagePath::new(&owner, &listing, "1700000000000.png");
        let prefix = ImagePath::prefix(&owner, &listing);
        assert!(path.as_ref().starts_with(prefix.as_ref()));
        assert!(path.as_ref().ends_with("/1700000000000.png"));
    }

    #[test]
    fn extension_falls_back() {
        assert_eq!(ImageFile::new("drill.JPG", "image/jpeg", vec![1]).extension(), "JPG");
        assert_eq!(ImageFile::new("drill", "image/jpeg", vec![1]).extension(), "bin");
        assert_eq!(ImageFile::new("drill.", "image/jpeg", vec![1]).extension(), "bin");
    }
}
