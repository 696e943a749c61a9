//! Provides platform specific logic and [`PlatformService`] to access it.

use async_trait::async_trait;

use crate::error::AtlasError;

/// Service providing HTTP access in a platform independent way.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PlatformService {
    /// Creates a new instance of the service.
    fn new() -> Self;
    /// Loads the body of the given url as text.
    async fn get_text(&self, url: &str) -> Result<String, AtlasError>;
    /// Posts `body` with the given content type and returns the response body as text.
    async fn post_text(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<String, AtlasError>;
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

/// Default implementation of the [`PlatformService`] for the current platform.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformServiceImpl = native::NativePlatformService;
