use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use error_stack::Report;

use kernel::interface::storage::ImageStorage;
use kernel::prelude::entity::{ImageFile, ImagePath, ImageUrl};
use kernel::KernelError;

/// Object store kept in process memory. Uploads can be switched to fail.
#[derive(Default)]
pub struct InMemoryImageStorage {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    failing: AtomicBool,
}

impl InMemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn objects(
        &self,
    ) -> error_stack::Result<MutexGuard<'_, BTreeMap<String, Vec<u8>>>, KernelError> {
        self.objects.lock().map_err(|_| {
            Report::new(KernelError::Internal).attach_printable("Storage lock poisoned")
        })
    }
}

#[async_trait::async_trait]
impl ImageStorage for InMemoryImageStorage {
    async fn upload(
        &self,
        path: &ImagePath,
        file: &ImageFile,
    ) -> error_stack::Result<ImageUrl, KernelError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Report::new(KernelError::Internal).attach_printable("Upload refused"));
        }
        let key: &String = path.as_ref();
        self.objects()?.insert(key.clone(), file.bytes().clone());
        Ok(ImageUrl::new(format!("memory://listing_images/{key}")))
    }

    async fn remove_prefix(&self, prefix: &ImagePath) -> error_stack::Result<(), KernelError> {
        let folder = format!("{}/", prefix.as_ref());
        self.objects()?.retain(|path, _| !path.starts_with(&folder));
        Ok(())
    }
}
