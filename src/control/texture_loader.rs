use std::{path::PathBuf, sync::Arc};

use bytes::Bytes;
use futures::{future::BoxFuture, FutureExt};
use image::{imageops::FilterType, RgbaImage};
use tokio::{runtime::Handle, task::spawn_blocking};

use crate::{error::GlobeError, scene::material::TextureTarget};

/// Largest texture side accepted by the default wgpu limits.
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

#[derive(Debug)]
pub enum TextureEvent {
    Loaded {
        target: TextureTarget,
        uri: String,
        image: Arc<RgbaImage>,
    },
    Failed {
        target: TextureTarget,
        uri: String,
        reason: String,
    },
}

/// Starts a texture load without waiting for it.
pub trait TextureRequester {
    fn request(&self, target: TextureTarget, uri: &str);
}

/// Carries finished loads back to the thread that owns the scene.
pub trait TextureSink: Send + Sync + 'static {
    fn deliver(&self, event: TextureEvent);
}

impl TextureSink for futures::channel::mpsc::UnboundedSender<TextureEvent> {
    fn deliver(&self, event: TextureEvent) {
        if let Err(err) = self.unbounded_send(event) {
            log::error!("Texture event dropped: {err}");
        }
    }
}

pub trait ImageSource: Send + Sync + 'static {
    fn fetch(&self, uri: &str) -> BoxFuture<'static, Result<Bytes, GlobeError>>;
}

/// Reads `http(s)://` URIs over the network and everything else from disk,
/// relative to `asset_root`.
#[derive(Debug, Clone)]
pub struct AssetSource {
    client: reqwest::Client,
    asset_root: PathBuf,
}

impl AssetSource {
    pub fn new(asset_root: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            asset_root,
        }
    }

    pub fn is_remote(uri: &str) -> bool {
        uri.starts_with("http://") || uri.starts_with("https://")
    }
}

impl ImageSource for AssetSource {
    fn fetch(&self, uri: &str) -> BoxFuture<'static, Result<Bytes, GlobeError>> {
        if Self::is_remote(uri) {
            let request = self.client.get(uri);
            async move { Ok(request.send().await?.error_for_status()?.bytes().await?) }.boxed()
        } else {
            let path = self.asset_root.join(uri);
            async move {
                tokio::fs::read(&path)
                    .await
                    .map(Bytes::from)
                    .map_err(|source| GlobeError::Io { path, source })
            }
            .boxed()
        }
    }
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, GlobeError> {
    let mut image = image::load_from_memory(bytes)?;
    if image.width() > MAX_TEXTURE_DIMENSION || image.height() > MAX_TEXTURE_DIMENSION {
        log::info!(
            "Downscaling {}x{} texture to fit {MAX_TEXTURE_DIMENSION}",
            image.width(),
            image.height()
        );
        image = image.resize(
            MAX_TEXTURE_DIMENSION,
            MAX_TEXTURE_DIMENSION,
            FilterType::Triangle,
        );
    }
    Ok(image.to_rgba8())
}

/// Fetches and decodes textures on a background runtime.
///
/// Nothing here touches the scene: results go to the sink and are applied by
/// whoever owns the scene graph.
#[derive(Clone)]
pub struct TextureLoader {
    runtime: Handle,
    source: Arc<dyn ImageSource>,
    sink: Arc<dyn TextureSink>,
}

impl TextureLoader {
    pub fn new(runtime: Handle, source: Arc<dyn ImageSource>, sink: Arc<dyn TextureSink>) -> Self {
        Self {
            runtime,
            source,
            sink,
        }
    }

    pub async fn load(source: Arc<dyn ImageSource>, uri: &str) -> Result<RgbaImage, GlobeError> {
        let bytes = source.fetch(uri).await?;
        log::debug!("Fetched {} bytes from {uri}", bytes.len());
        spawn_blocking(move || decode_image(&bytes)).await?
    }
}

impl TextureRequester for TextureLoader {
    fn request(&self, target: TextureTarget, uri: &str) {
        let source = Arc::clone(&self.source);
        let sink = Arc::clone(&self.sink);
        let uri = uri.to_owned();

        self.runtime.spawn(async move {
            let event = match Self::load(source, &uri).await {
                Ok(image) => TextureEvent::Loaded {
                    target,
                    uri,
                    image: Arc::new(image),
                },
                Err(err) => TextureEvent::Failed {
                    target,
                    uri,
                    reason: err.to_string(),
                },
            };
            sink.deliver(event);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::Path};

    use futures::{channel::mpsc, StreamExt};
    use image::{DynamicImage, ImageFormat, Rgba};

    use crate::scene::{
        assets::SceneAssets,
        material::{Material, TextureSlot},
    };

    use super::*;

    struct FailingSource;

    impl ImageSource for FailingSource {
        fn fetch(&self, uri: &str) -> BoxFuture<'static, Result<Bytes, GlobeError>> {
            let path = PathBuf::from(uri);
            async move {
                Err(GlobeError::Io {
                    path,
                    source: std::io::Error::other("connection reset"),
                })
            }
            .boxed()
        }
    }

    fn asset_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("volcano-globe-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn loader(source: Arc<dyn ImageSource>) -> (TextureLoader, mpsc::UnboundedReceiver<TextureEvent>) {
        let (sender, receiver) = mpsc::unbounded();
        (
            TextureLoader::new(Handle::current(), source, Arc::new(sender)),
            receiver,
        )
    }

    fn target(assets: &mut SceneAssets) -> TextureTarget {
        TextureTarget {
            material: assets.add_material(Material::phong()),
            slot: TextureSlot::Map,
        }
    }

    fn png_bytes(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn loads_texture_from_asset_root() {
        let dir = asset_dir("load");
        let image = RgbaImage::from_pixel(3, 2, Rgba([200, 10, 10, 255]));
        std::fs::write(dir.join("lava.png"), png_bytes(image)).unwrap();
        let (loader, mut receiver) = loader(Arc::new(AssetSource::new(dir)));
        let mut assets = SceneAssets::new();
        let target = target(&mut assets);

        loader.request(target, "lava.png");

        match receiver.next().await.unwrap() {
            TextureEvent::Loaded {
                target: loaded,
                uri,
                image,
            } => {
                assert_eq!(loaded, target);
                assert_eq!(uri, "lava.png");
                assert_eq!(image.dimensions(), (3, 2));
                assert_eq!(image.get_pixel(0, 0), &Rgba([200, 10, 10, 255]));
            }
            event => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_reported_not_raised() {
        let dir = asset_dir("missing");
        let (loader, mut receiver) = loader(Arc::new(AssetSource::new(dir)));
        let mut assets = SceneAssets::new();
        let target = target(&mut assets);

        loader.request(target, "does_not_exist.jpg");

        let event = receiver.next().await.unwrap();
        assert!(matches!(
            event,
            TextureEvent::Failed { target: failed, .. } if failed == target
        ));
        assert!(assets
            .material(target.material)
            .texture(TextureSlot::Map)
            .is_none());
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let (loader, mut receiver) = loader(Arc::new(FailingSource));
        let mut assets = SceneAssets::new();

        loader.request(target(&mut assets), "https://example.invalid/earth.jpg");

        match receiver.next().await.unwrap() {
            TextureEvent::Failed { reason, uri, .. } => {
                assert_eq!(uri, "https://example.invalid/earth.jpg");
                assert!(reason.contains("connection reset"));
            }
            event => panic!("unexpected event {event:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_decode() {
        let dir = asset_dir("garbage");
        std::fs::write(dir.join("broken.png"), b"definitely not a png").unwrap();
        let (loader, mut receiver) = loader(Arc::new(AssetSource::new(dir)));
        let mut assets = SceneAssets::new();

        loader.request(target(&mut assets), "broken.png");

        assert!(matches!(
            receiver.next().await.unwrap(),
            TextureEvent::Failed { .. }
        ));
    }

    #[test]
    fn oversized_images_are_downscaled() {
        let bytes = png_bytes(RgbaImage::new(MAX_TEXTURE_DIMENSION + 2, 2));

        let image = decode_image(&bytes).unwrap();

        assert!(image.width() <= MAX_TEXTURE_DIMENSION);
        assert!(image.height() >= 1);
    }

    #[test]
    fn remote_uris_are_recognised() {
        assert!(AssetSource::is_remote("https://s3.amazonaws.com/starfield.png"));
        assert!(AssetSource::is_remote("http://localhost/earth.jpg"));
        assert!(!AssetSource::is_remote("earth_diffuse.jpg"));
        assert!(!AssetSource::is_remote(Path::new("textures").join("x.png").to_str().unwrap()));
    }
}
