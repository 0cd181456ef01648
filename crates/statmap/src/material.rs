use std::collections::BTreeMap;

/// Uniform carrying the blend between `height1` and `height2`.
pub const HEIGHT_MORPH: &str = "heightMorph";

/// Owned uniform table handed to the renderer every tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryMaterial {
    uniforms: BTreeMap<String, f32>,
    pub translucent: bool,
    pub closed: bool,
    pub flat: bool,
}

impl BoundaryMaterial {
    pub fn new() -> Self {
        let mut material = Self::default();
        material.set_uniform(HEIGHT_MORPH, 0.0);
        material
    }

    pub fn set_uniform(&mut self, name: impl Into<String>, value: f32) {
        self.uniforms.insert(name.into(), value);
    }

    pub fn uniform(&self, name: &str) -> Option<f32> {
        self.uniforms.get(name).copied()
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.uniforms.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn height_morph(&self) -> f32 {
        self.uniform(HEIGHT_MORPH).unwrap_or(0.0)
    }
}
