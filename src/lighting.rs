//! Scene lighting parameters and the debug lighting modes.

use cgmath::Vector3;

use crate::data_structures::{material::{Material, ShaderProgram}, uniform::UniformValue};

/// Which lighting terms the Blinn-Phong program shows.
///
/// `Full` clears every flag; the others set exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LightingMode {
    #[default]
    Full,
    NoLighting,
    Ambient,
    Specular,
    AmbientAndSpecular,
    Toon,
}

impl LightingMode {
    const FLAGS: [&'static str; 5] = [
        "u_NoLighting",
        "u_Ambient",
        "u_Specular",
        "u_AmbientAndSpecular",
        "u_AmbientSpecularToon",
    ];

    /// Selectable modes with their button labels.
    pub const BUTTONS: [(LightingMode, &'static str); 5] = [
        (LightingMode::NoLighting, "No Lighting"),
        (LightingMode::Ambient, "Ambient Lighting"),
        (LightingMode::Specular, "Specular Lighting"),
        (LightingMode::AmbientAndSpecular, "Ambient and Specular Lighting"),
        (LightingMode::Toon, "Other Effect"),
    ];

    fn active_flag(self) -> Option<&'static str> {
        match self {
            LightingMode::Full => None,
            LightingMode::NoLighting => Some("u_NoLighting"),
            LightingMode::Ambient => Some("u_Ambient"),
            LightingMode::Specular => Some("u_Specular"),
            LightingMode::AmbientAndSpecular => Some("u_AmbientAndSpecular"),
            LightingMode::Toon => Some("u_AmbientSpecularToon"),
        }
    }

    /// Flag uniform values for this mode.
    pub fn flags(self) -> impl Iterator<Item = (&'static str, i32)> {
        let active = self.active_flag();
        Self::FLAGS
            .into_iter()
            .map(move |name| (name, i32::from(Some(name) == active)))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightSettings {
    pub light_pos: Vector3<f32>,
    pub light_col: Vector3<f32>,
    pub light_ambient_strength: f32,
    pub light_specular_strength: f32,
    pub ambient_col: Vector3<f32>,
    pub ambient_strength: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
    pub mode: LightingMode,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            light_pos: Vector3::new(0.0, 0.0, 2.0),
            light_col: Vector3::new(0.9, 0.85, 0.5),
            light_ambient_strength: 1.5,
            light_specular_strength: 1.0,
            ambient_col: Vector3::new(1.0, 1.0, 1.0),
            ambient_strength: 0.1,
            attenuation_linear: 0.09,
            attenuation_quadratic: 0.032,
            mode: LightingMode::Full,
        }
    }
}

impl LightSettings {
    fn values(&self) -> Vec<(&'static str, UniformValue)> {
        let mut values = vec![
            ("u_LightPos", self.light_pos.into()),
            ("u_LightCol", self.light_col.into()),
            ("u_AmbientLightStrength", self.light_ambient_strength.into()),
            ("u_SpecularLightStrength", self.light_specular_strength.into()),
            ("u_AmbientCol", self.ambient_col.into()),
            ("u_AmbientStrength", self.ambient_strength.into()),
            ("u_LightAttenuationConstant", 1.0_f32.into()),
            ("u_LightAttenuationLinear", self.attenuation_linear.into()),
            ("u_LightAttenuationQuadratic", self.attenuation_quadratic.into()),
        ];
        values.extend(self.mode.flags().map(|(name, flag)| (name, flag.into())));
        values
    }

    /// Push every lighting uniform to a program.
    pub fn apply(&self, program: &mut ShaderProgram) {
        for (name, value) in self.values() {
            program.set_uniform(name, value);
        }
    }

    /// Copy the current lighting onto a material, overriding its program's values.
    pub fn apply_to_material(&self, material: &mut Material) {
        for (name, value) in self.values() {
            material.set(name, value);
        }
    }
}
