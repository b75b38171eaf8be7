use crate::entity::{ImageFile, ImagePath, ImageUrl};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ImageStorage: 'static + Sync + Send {
    /// Stores the file at `path` and returns its public URL.
    async fn upload(
        &self,
        path: &ImagePath,
        file: &ImageFile,
    ) -> error_stack::Result<ImageUrl, KernelError>;

    async fn remove_prefix(&self, prefix: &ImagePath) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnImageStorage: 'static + Sync + Send {
    type ImageStorage: ImageStorage;
    fn image_storage(&self) -> &Self::ImageStorage;
}
