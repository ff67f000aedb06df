//! Frame driver and application event loop.
//!
//! [`App`] owns the window, the GPU context, the scene and the overlay, and
//! drives one frame per redraw:
//! 1. Collect window/device events into the input state
//! 2. Measure the clamped frame step
//! 3. Update the scene (key actions, behaviours, transforms)
//! 4. Sort and draw the scene
//! 5. Build and paint the debug overlay
//! 6. Present the frame
//!
//! On close the scene is released first, then the GPU resources, then the
//! window and device.

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, Settings},
    input::InputState,
    overlay::Overlay,
    pipelines::scene::GpuScene,
    resources::AssetRoot,
    scene::Scene,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Initializing,
    Running,
    ShuttingDown,
}

/// Wall clock between frames.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: Instant::now(),
            max_delta,
        }
    }

    /// Seconds since the previous tick, clamped to `[0, max_delta]`.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        Self::clamp(raw, self.max_delta)
    }

    pub fn clamp(raw: f32, max_delta: f32) -> f32 {
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, max_delta)
    }
}

struct AppState {
    ctx: Context,
    scene: Scene,
    gpu: GpuScene,
    overlay: Overlay,
    input: InputState,
    clock: FrameClock,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let ctx = Context::new(window.clone(), settings).await?;
        let scene = Scene::build(&AssetRoot::new(&settings.asset_root), settings).await;
        let gpu = GpuScene::new(&ctx.device, &ctx.queue, ctx.config.format, &scene.assets);
        let overlay = Overlay::new(&ctx.device, ctx.config.format, &window);
        let mut state = Self {
            ctx,
            scene,
            gpu,
            overlay,
            input: InputState::new(),
            clock: FrameClock::new(settings.max_frame_delta),
        };
        let [width, height] = state.ctx.size();
        state.scene.resize(width, height);
        Ok(state)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);
            self.scene.resize(width, height);
        }
    }

    fn frame(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        let dt = self.clock.tick();
        self.scene.update(dt, &self.input, self.overlay.wants_keyboard());

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(t) | wgpu::CurrentSurfaceTexture::Suboptimal(t) => t,
            other => return Err(other),
        };
        let stats = self.scene.render(&mut self.gpu);
        log::trace!("{stats:?}");
        self.overlay.run(self.ctx.window(), &mut self.scene);
        self.gpu.sync_materials(&self.ctx.queue, &self.scene.assets);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            self.gpu.encode(&self.ctx.device, &self.ctx.queue, &mut render_pass);
        }
        let overlay_commands = self.overlay.paint(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &view,
            self.ctx.size(),
        );

        self.ctx
            .queue
            .submit(overlay_commands.into_iter().chain(iter::once(encoder.finish())));
        output.present();
        Ok(())
    }

    /// Release in dependency order: scene data, GPU resources, then the device.
    fn teardown(self) {
        let AppState {
            ctx,
            scene,
            gpu,
            overlay,
            ..
        } = self;
        drop(scene);
        log::info!("Scene released");
        drop(overlay);
        drop(gpu);
        log::info!("GPU resources released");
        drop(ctx);
    }
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    settings: Settings,
    state: Option<AppState>,
    frame_state: FrameState,
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Settings) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            settings,
            state: None,
            frame_state: FrameState::Initializing,
            init_error: None,
        })
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame_state
    }

    fn record_init_failure(&mut self, error: anyhow::Error) {
        log::error!("App initialization failed: {:#}", error);
        self.frame_state = FrameState::ShuttingDown;
        self.init_error = Some(error);
    }

    /// Outcome of the run once the event loop has returned.
    fn finish(mut self) -> anyhow::Result<()> {
        match self.init_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.frame_state = FrameState::ShuttingDown;
        if let Some(state) = self.state.take() {
            state.teardown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.init_error.is_some() {
            return;
        }
        if let Err(e) = self.settings.validate() {
            self.record_init_failure(e);
            return self.shut_down(event_loop);
        }
        let window_attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.record_init_failure(anyhow::Error::new(e).context("Unable to create a window"));
                return self.shut_down(event_loop);
            }
        };

        match self.async_runtime.block_on(AppState::new(window, &self.settings)) {
            Ok(state) => {
                state.ctx.window().request_redraw();
                self.state = Some(state);
                self.frame_state = FrameState::Running;
            }
            Err(e) => {
                self.record_init_failure(e);
                self.shut_down(event_loop);
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(state) = &mut self.state {
            state.input.handle_device_event(&event);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: winit::window::WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        let consumed = state.overlay.handle_window_event(state.ctx.window(), &event);
        // presses on the panel stay there, releases always reach the scene input
        let pressed_on_panel = consumed
            && matches!(
                event,
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    ..
                }
            );
        if !pressed_on_panel {
            state.input.handle_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => self.shut_down(event_loop),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                match state.frame() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window().inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
                state.input.end_frame();
                state.ctx.window().request_redraw();
            }
            _ => {}
        }
    }
}

/// Run the demo with default settings.
pub fn run() -> anyhow::Result<()> {
    run_with(Settings::default())
}

pub fn run_with(settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::builder().with_any_thread(true).build()?
    };

    #[cfg(not(all(feature = "integration-tests", any(target_os = "linux", target_os = "windows"))))]
    let event_loop = EventLoop::new()?;

    let mut app = App::new(settings)?;
    event_loop.run_app(&mut app)?;

    app.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_frames_are_clamped() {
        assert_eq!(FrameClock::clamp(3.5, 1.0), 1.0);
        assert_eq!(FrameClock::clamp(0.25, 1.0), 0.25);
    }

    #[test]
    fn negative_and_nan_steps_become_zero() {
        assert_eq!(FrameClock::clamp(-0.1, 1.0), 0.0);
        assert_eq!(FrameClock::clamp(f32::NAN, 1.0), 0.0);
    }

    #[test]
    fn failed_init_is_reported_after_the_loop() -> anyhow::Result<()> {
        let mut app = App::new(Settings {
            width: 0,
            ..Settings::default()
        })?;
        let error = app.settings.validate().unwrap_err();
        app.record_init_failure(error);
        assert_eq!(app.frame_state(), FrameState::ShuttingDown);

        let error = app.finish().unwrap_err();
        assert!(format!("{error:#}").contains("window size"));
        Ok(())
    }

    #[test]
    fn clean_run_finishes_ok() -> anyhow::Result<()> {
        let app = App::new(Settings::default())?;
        assert_eq!(app.frame_state(), FrameState::Initializing);
        assert!(app.finish().is_ok());
        Ok(())
    }

    #[test]
    fn tick_never_exceeds_max() {
        let mut clock = FrameClock::new(0.5);
        let dt = clock.tick();
        assert!((0.0..=0.5).contains(&dt));
    }
}
