//! Snapshot capture — rasterize the rendered board and push it to the CDN.
//!
//! A missing capture is a normal outcome (`None`), not an error: the save
//! path proceeds without a snapshot rather than aborting.

use tracing::warn;

use crate::upload::{CapturedImage, ImageUploader};

/// Rasterization collaborator: turns the on-screen board into an image.
pub trait RenderTarget {
    /// Capture the rendered board. `None` when rendering produced no output.
    fn capture(&self) -> Option<CapturedImage>;
}

/// Capture the board and upload the result, best-effort.
///
/// Returns `None` when the capture produced nothing or the upload failed.
/// Snapshot failures never abort the enclosing board save; user photos go
/// through the uploader directly and keep their failures fatal.
pub async fn capture_and_upload_snapshot(
    target: &dyn RenderTarget,
    uploader: &dyn ImageUploader,
) -> Option<String> {
    let Some(image) = target.capture() else {
        warn!("board capture produced no image; saving without snapshot");
        return None;
    };

    match uploader.upload(image).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, "snapshot upload failed; saving without snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadError;

    struct FixedTarget(Option<CapturedImage>);

    impl RenderTarget for FixedTarget {
        fn capture(&self) -> Option<CapturedImage> {
            self.0.clone()
        }
    }

    struct FixedUploader(Result<String, ()>);

    #[async_trait::async_trait]
    impl ImageUploader for FixedUploader {
        async fn upload(&self, _image: CapturedImage) -> Result<String, UploadError> {
            self.0.clone().map_err(|()| UploadError::MissingUrl)
        }
    }

    fn png() -> CapturedImage {
        CapturedImage {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            file_name: "board.png".into(),
            content_type: "image/png".into(),
        }
    }

    #[tokio::test]
    async fn capture_failure_yields_none() {
        let target = FixedTarget(None);
        let uploader = FixedUploader(Ok("https://cdn.example/x.png".into()));
        assert!(capture_and_upload_snapshot(&target, &uploader).await.is_none());
    }

    #[tokio::test]
    async fn upload_failure_yields_none() {
        let target = FixedTarget(Some(png()));
        let uploader = FixedUploader(Err(()));
        assert!(capture_and_upload_snapshot(&target, &uploader).await.is_none());
    }

    #[tokio::test]
    async fn successful_capture_and_upload_yields_url() {
        let target = FixedTarget(Some(png()));
        let uploader = FixedUploader(Ok("https://cdn.example/board.png".into()));
        assert_eq!(
            capture_and_upload_snapshot(&target, &uploader).await.as_deref(),
            Some("https://cdn.example/board.png")
        );
    }
}
