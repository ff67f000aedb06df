//! The "Debug" overlay panel.
//!
//! The panel is a list of [`PanelSection`] tags drawn in order against the
//! scene. Sections talk to the toolkit only through [`DebugUi`], which
//! `egui::Ui` implements; tests drive the same sections with a scripted
//! implementation.

use std::ops::RangeInclusive;

use cgmath::Vector3;

use crate::{behaviour::SimpleMove, lighting::LightingMode, scene::Scene};

/// The widgets the debug panel needs.
pub trait DebugUi {
    fn collapsing(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn DebugUi));
    fn slider(&mut self, label: &str, value: &mut f32, range: RangeInclusive<f32>) -> bool;
    fn drag(&mut self, label: &str, value: &mut f32, speed: f32, range: RangeInclusive<f32>) -> bool;
    fn drag_vec3(&mut self, label: &str, value: &mut Vector3<f32>, speed: f32, range: RangeInclusive<f32>) -> bool;
    fn color_edit(&mut self, label: &str, rgb: &mut Vector3<f32>) -> bool;
    fn button(&mut self, label: &str) -> bool;
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;
    fn text(&mut self, text: &str);
    fn plot(&mut self, label: &str, values: &[f32]);
}

/// Ring buffer of recent frame rates.
#[derive(Clone, Debug)]
pub struct FpsTracker {
    samples: [f32; Self::CAPACITY],
    cursor: usize,
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self {
            samples: [0.0; Self::CAPACITY],
            cursor: 0,
        }
    }
}

impl FpsTracker {
    pub const CAPACITY: usize = 128;

    /// Record one frame of `dt` seconds.
    pub fn push(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.samples[self.cursor] = 1.0 / dt;
        self.cursor = (self.cursor + 1) % Self::CAPACITY;
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// (min, max, average) over the whole window, unfilled slots count as zero.
    pub fn stats(&self) -> (f32, f32, f32) {
        let min = self.samples.iter().copied().fold(f32::MAX, f32::min);
        let max = self.samples.iter().copied().fold(0.0, f32::max);
        let avg = self.samples.iter().sum::<f32>() / Self::CAPACITY as f32;
        (min, max, avg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelSection {
    SceneLighting,
    LightLighting,
    LightingModes,
    Controllable,
    Fps,
}

impl PanelSection {
    pub fn draw(self, ui: &mut dyn DebugUi, scene: &mut Scene) {
        match self {
            PanelSection::SceneLighting => {
                ui.collapsing("Scene Level Lighting Settings", &mut |ui| {
                    let mut light = scene.lighting().clone();
                    let mut changed = ui.color_edit("Ambient Color", &mut light.ambient_col);
                    changed |= ui.slider("Fixed Ambient Power", &mut light.ambient_strength, 0.01..=1.0);
                    if changed {
                        scene.set_lighting(light);
                    }
                });
            }
            PanelSection::LightLighting => {
                ui.collapsing("Light Level Lighting Settings", &mut |ui| {
                    let mut light = scene.lighting().clone();
                    let mut changed = ui.drag_vec3("Light Pos", &mut light.light_pos, 0.01, -10.0..=10.0);
                    changed |= ui.color_edit("Light Col", &mut light.light_col);
                    changed |= ui.slider("Light Ambient Power", &mut light.light_ambient_strength, 0.0..=1.0);
                    changed |= ui.slider("Light Specular Power", &mut light.light_specular_strength, 0.0..=1.0);
                    changed |= ui.drag("Light Linear Falloff", &mut light.attenuation_linear, 0.01, 0.0..=1.0);
                    changed |= ui.drag("Light Quadratic Falloff", &mut light.attenuation_quadratic, 0.01, 0.0..=1.0);
                    if changed {
                        scene.set_lighting(light);
                    }
                });
            }
            PanelSection::LightingModes => {
                ui.collapsing("Lighting Modes", &mut |ui| {
                    for (mode, label) in LightingMode::BUTTONS {
                        if ui.button(label) {
                            let mut light = scene.lighting().clone();
                            light.mode = mode;
                            scene.set_lighting(light);
                        }
                    }
                });
            }
            PanelSection::Controllable => {
                let Some(selected) = scene.selected_controllable() else {
                    return;
                };
                let name = scene.registry.name(selected).unwrap_or("<unnamed>").to_string();
                ui.text(&name);
                if let Some(mover) = scene.registry.behaviour_mut::<SimpleMove>(selected) {
                    ui.checkbox("Relative Rotation", &mut mover.relative);
                }
                ui.text("Q/E -> Yaw\nLeft/Right -> Roll\nUp/Down -> Pitch\nY -> Toggle Mode");
            }
            PanelSection::Fps => {
                let (min, max, avg) = scene.fps.stats();
                ui.plot("FPS", scene.fps.samples());
                ui.text(&format!("MIN: {min:.2} MAX: {max:.2} AVG: {avg:.2}"));
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct DebugPanel {
    pub title: String,
    pub sections: Vec<PanelSection>,
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self {
            title: "Debug".to_string(),
            sections: vec![
                PanelSection::SceneLighting,
                PanelSection::LightLighting,
                PanelSection::LightingModes,
                PanelSection::Controllable,
                PanelSection::Fps,
            ],
        }
    }
}

impl DebugPanel {
    pub fn draw(&self, ui: &mut dyn DebugUi, scene: &mut Scene) {
        for section in &self.sections {
            section.draw(ui, scene);
        }
    }

    /// Show the panel as an egui window.
    pub fn show(&self, ctx: &egui::Context, scene: &mut Scene) {
        egui::Window::new(&self.title)
            .default_pos([10.0, 10.0])
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| self.draw(ui, scene));
    }
}

impl DebugUi for egui::Ui {
    fn collapsing(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn DebugUi)) {
        egui::CollapsingHeader::new(title).show(self, |ui| body(ui));
    }

    fn slider(&mut self, label: &str, value: &mut f32, range: RangeInclusive<f32>) -> bool {
        self.add(egui::Slider::new(value, range).text(label)).changed()
    }

    fn drag(&mut self, label: &str, value: &mut f32, speed: f32, range: RangeInclusive<f32>) -> bool {
        self.horizontal(|ui| {
            let changed = ui
                .add(egui::DragValue::new(value).speed(speed).range(range))
                .changed();
            ui.label(label);
            changed
        })
        .inner
    }

    fn drag_vec3(&mut self, label: &str, value: &mut Vector3<f32>, speed: f32, range: RangeInclusive<f32>) -> bool {
        self.horizontal(|ui| {
            let mut changed = false;
            for component in [&mut value.x, &mut value.y, &mut value.z] {
                changed |= ui
                    .add(egui::DragValue::new(component).speed(speed).range(range.clone()))
                    .changed();
            }
            ui.label(label);
            changed
        })
        .inner
    }

    fn color_edit(&mut self, label: &str, rgb: &mut Vector3<f32>) -> bool {
        let mut raw: [f32; 3] = (*rgb).into();
        let changed = self
            .horizontal(|ui| {
                let changed = ui.color_edit_button_rgb(&mut raw).changed();
                ui.label(label);
                changed
            })
            .inner;
        if changed {
            *rgb = raw.into();
        }
        changed
    }

    fn button(&mut self, label: &str) -> bool {
        egui::Ui::button(self, label).clicked()
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        egui::Ui::checkbox(self, value, label).changed()
    }

    fn text(&mut self, text: &str) {
        self.label(text);
    }

    fn plot(&mut self, label: &str, values: &[f32]) {
        self.label(label);
        let size = egui::vec2(self.available_width().max(64.0), 48.0);
        let (rect, _) = self.allocate_exact_size(size, egui::Sense::hover());
        let painter = self.painter_at(rect);
        painter.rect_filled(rect, 2.0, self.visuals().extreme_bg_color);
        let max = values.iter().copied().fold(f32::EPSILON, f32::max);
        let step = rect.width() / values.len().saturating_sub(1).max(1) as f32;
        let points: Vec<egui::Pos2> = values
            .iter()
            .enumerate()
            .map(|(i, v)| egui::pos2(rect.left() + i as f32 * step, rect.bottom() - v / max * rect.height()))
            .collect();
        painter.add(egui::Shape::line(
            points,
            egui::Stroke::new(1.0, self.visuals().widgets.active.fg_stroke.color),
        ));
    }
}
