//! The egui debug overlay: the per-frame UI pass against the scene and
//! painting it on top of the scene.
//!
//! Window input goes through `egui_winit`, painting through `egui_wgpu`.

use egui::ViewportId;
use egui_wgpu::ScreenDescriptor;
use winit::{event::WindowEvent, window::Window};

use crate::{scene::Scene, ui::DebugPanel};

/// One egui pass showing `panel` against `scene`.
pub fn run_panel(
    ctx: &egui::Context,
    panel: &DebugPanel,
    raw_input: egui::RawInput,
    scene: &mut Scene,
) -> egui::FullOutput {
    ctx.begin_pass(raw_input);
    panel.show(ctx, scene);
    ctx.end_pass()
}

/// The debug panel and everything needed to show it.
pub struct Overlay {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    panel: DebugPanel,
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let scale_factor = window.scale_factor() as f32;
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            ViewportId::ROOT,
            window,
            Some(scale_factor),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );
        let renderer = egui_wgpu::Renderer::new(
            device,
            format,
            egui_wgpu::RendererOptions {
                msaa_samples: 1,
                depth_stencil_format: None,
                ..Default::default()
            },
        );

        Self {
            ctx,
            winit_state,
            renderer,
            panel: DebugPanel::default(),
            primitives: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            pixels_per_point: scale_factor,
        }
    }

    /// Returns true when egui consumed the event.
    pub fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// True while a widget has keyboard focus; scene key bindings are skipped then.
    pub fn wants_keyboard(&self) -> bool {
        self.ctx.egui_wants_keyboard_input()
    }

    /// Build this frame's UI against the scene.
    pub fn run(&mut self, window: &Window, scene: &mut Scene) {
        let raw_input = self.winit_state.take_egui_input(window);
        let output = run_panel(&self.ctx, &self.panel, raw_input, scene);
        self.winit_state
            .handle_platform_output(window, output.platform_output);
        self.pixels_per_point = output.pixels_per_point;
        self.primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta.append(output.textures_delta);
    }

    /// Paint the last UI pass over `view`.
    ///
    /// Returns command buffers egui needs submitted before `encoder`.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer> {
        let screen = ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: self.pixels_per_point,
        };
        let delta = std::mem::take(&mut self.textures_delta);
        for (id, image_delta) in &delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let extra = self
            .renderer
            .update_buffers(device, queue, encoder, &self.primitives, &screen);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Overlay Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut render_pass, &self.primitives, &screen);
        }

        for id in &delta.free {
            self.renderer.free_texture(id);
        }
        extra
    }
}
