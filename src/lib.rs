pub mod app;
pub mod common;
pub mod control;
pub mod error;
pub mod render;
pub mod scene;
pub mod settings;

use std::sync::Arc;

use app::{Application, GlobeEvent, ProxySink};
use color_eyre::eyre::Result;
use common::{data::Size, dataset::read_features};
use control::texture_loader::{AssetSource, TextureLoader};
use scene::graph::SceneGraph;
use settings::Settings;
use tokio::runtime::Runtime;
use winit::event_loop::EventLoop;

pub fn start() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let settings = Settings::load()?;
    let features = read_features(&settings.dataset_path())?;

    // fetch and decode run here, the scene stays on the event loop thread
    let background_runtime = Runtime::new()?;

    let event_loop = EventLoop::<GlobeEvent>::with_user_event().build()?;
    let loader = TextureLoader::new(
        background_runtime.handle().clone(),
        Arc::new(AssetSource::new(settings.asset_root.clone())),
        Arc::new(ProxySink::new(event_loop.create_proxy())),
    );

    let viewport = Size {
        width: settings.window.width,
        height: settings.window.height,
    };
    let scene = SceneGraph::build(
        &settings.planet,
        &settings.skybox,
        &features,
        &loader,
        viewport,
    )?;

    let mut app = Application::new(&settings, scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}
