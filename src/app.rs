use std::sync::{Arc, Mutex};

use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    control::{
        announcement::{AnnouncementControl, LoggedAnnouncement},
        input_controller::InputController,
        render_loop::{CameraState, RenderLoop},
        texture_loader::{TextureEvent, TextureSink},
    },
    error::DrawError,
    render::render_engine::RenderEngine,
    scene::graph::SceneGraph,
    settings::Settings,
};

#[derive(Debug)]
pub enum GlobeEvent {
    Texture(TextureEvent),
}

/// Forwards finished texture loads into the event loop.
pub struct ProxySink(Mutex<EventLoopProxy<GlobeEvent>>);

impl ProxySink {
    pub fn new(proxy: EventLoopProxy<GlobeEvent>) -> Self {
        Self(Mutex::new(proxy))
    }
}

impl TextureSink for ProxySink {
    fn deliver(&self, event: TextureEvent) {
        match self.0.lock() {
            Ok(proxy) => {
                if let Err(err) = proxy.send_event(GlobeEvent::Texture(event)) {
                    log::error!("Event loop closed, dropping texture: {err}");
                }
            }
            Err(err) => log::error!("{err}"),
        }
    }
}

pub struct Application {
    window_attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    scene: SceneGraph,
    camera_state: CameraState,
    render_loop: RenderLoop,
    input: InputController,
    announcement: AnnouncementControl,
}

impl Application {
    pub fn new(settings: &Settings, scene: SceneGraph) -> Self {
        let (width, height) = (settings.window.width, settings.window.height);
        let window_attributes = Window::default_attributes()
            .with_title(settings.window.title.clone())
            .with_inner_size(LogicalSize::new(width as f64, height as f64));

        Self {
            window_attributes,
            window: None,
            engine: None,
            scene,
            camera_state: settings.camera,
            render_loop: RenderLoop::new(),
            input: InputController::new(),
            announcement: AnnouncementControl::new(Box::new(LoggedAnnouncement::new(
                &settings.announcement,
            ))),
        }
    }
}

impl ApplicationHandler<GlobeEvent> for Application {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }

        let window = match event_loop.create_window(self.window_attributes.clone()) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Unable to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(RenderEngine::new(Arc::clone(&window))) {
            Ok(mut engine) => {
                self.scene.resize(window.inner_size().into(), &mut engine);
                window.request_redraw();
                self.window = Some(window);
                self.engine = Some(engine);
            }
            Err(err) => {
                log::error!("{err:?}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine) else {
            return;
        };

        if self.input.process_events(&event) {
            return;
        }

        match event {
            WindowEvent::Resized(physical_size) => {
                self.scene.resize(physical_size.into(), engine);
                // On macos the window needs to be redrawn manually after resizing
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                self.input
                    .apply(&mut self.camera_state, &mut self.announcement);

                match self.render_loop.tick(
                    &mut self.scene,
                    &mut self.camera_state,
                    window.as_ref(),
                    engine,
                ) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(DrawError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => engine.reconfigure(),
                    // This happens when the a frame takes too long to present
                    Err(DrawError::Surface(wgpu::SurfaceError::Timeout)) => {
                        log::warn!("Surface timeout")
                    }
                    Err(err) => {
                        log::error!("{err}");
                        event_loop.exit()
                    }
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            _ => {}
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: GlobeEvent) {
        match event {
            GlobeEvent::Texture(event) => {
                if self.scene.apply_texture(event) {
                    log::debug!("Scene updated after {} frames", self.render_loop.frames());
                }
            }
        }
    }
}
