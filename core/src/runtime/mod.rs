//! Effect runtime seam
//!
//! The toggler never talks to the shader runtime directly. Everything goes
//! through [`EffectRuntime`], which the host implements on top of its
//! post-processing API and tests implement with [`MemoryRuntime`].

mod memory;

pub use memory::{MemoryRuntime, RuntimeCall};

use toggler_types::{ENTIRE_RESHADE, UniformHandle};

/// Opaque handle to one technique (effect pass)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechniqueHandle(pub u64);

/// Element type reported for a uniform variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Bool,
    Int,
    UInt,
    Float,
    /// Anything the toggler does not know how to read or write
    Unsupported,
}

/// Shape of a uniform variable as reported by the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformType {
    pub base: BaseType,
    pub rows: u32,
    pub cols: u32,
    pub array_length: u32,
}

impl UniformType {
    pub fn scalar(base: BaseType) -> Self {
        Self {
            base,
            rows: 1,
            cols: 1,
            array_length: 0,
        }
    }

    pub fn vector(base: BaseType, rows: u32) -> Self {
        Self {
            base,
            rows,
            cols: 1,
            array_length: 0,
        }
    }

    /// Number of elements a value of this type carries.
    ///
    /// Arrays report their length, matrices rows × cols, vectors their row
    /// count; anything else is a scalar.
    pub fn dimension(&self) -> usize {
        let dim = if self.array_length > 0 {
            self.array_length
        } else if self.rows > 0 && self.cols > 0 {
            self.rows * self.cols
        } else if self.rows > 0 {
            self.rows
        } else if self.cols > 0 {
            self.cols
        } else {
            1
        };
        dim as usize
    }
}

/// Operations the toggler needs from the live effect runtime.
///
/// Implementations are driven from a single thread; none of the methods are
/// expected to block.
pub trait EffectRuntime {
    /// Techniques belonging to `effect`, or every technique when `None`
    fn techniques(&self, effect: Option<&str>) -> Vec<TechniqueHandle>;

    fn technique_effect_name(&self, technique: TechniqueHandle) -> String;

    fn set_technique_state(&mut self, technique: TechniqueHandle, enabled: bool);

    /// Global on/off for the whole runtime
    fn set_effects_state(&mut self, enabled: bool);

    fn find_uniform(&self, effect: &str, uniform: &str) -> Option<UniformHandle>;

    /// Uniform variables declared by `effect`, as `(name, handle)` pairs
    fn uniforms(&self, effect: &str) -> Vec<(String, UniformHandle)>;

    fn uniform_type(&self, handle: UniformHandle) -> Option<UniformType>;

    fn set_uniform_bool(&mut self, handle: UniformHandle, values: &[bool]);
    fn set_uniform_int(&mut self, handle: UniformHandle, values: &[i32]);
    fn set_uniform_float(&mut self, handle: UniformHandle, values: &[f32]);
    fn set_uniform_uint(&mut self, handle: UniformHandle, values: &[u32]);

    fn get_uniform_bool(&self, handle: UniformHandle, out: &mut [bool]);
    fn get_uniform_int(&self, handle: UniformHandle, out: &mut [i32]);
    fn get_uniform_float(&self, handle: UniformHandle, out: &mut [f32]);
    fn get_uniform_uint(&self, handle: UniformHandle, out: &mut [u32]);
}

/// Drive `effect` to `enabled`.
///
/// The reserved [`ENTIRE_RESHADE`] name switches the whole runtime instead of
/// individual techniques.
pub fn toggle_effect<R: EffectRuntime + ?Sized>(runtime: &mut R, effect: &str, enabled: bool) {
    if effect == ENTIRE_RESHADE {
        tracing::debug!(enabled, "Toggling entire runtime");
        runtime.set_effects_state(enabled);
        return;
    }

    let techniques = runtime.techniques(Some(effect));
    if techniques.is_empty() {
        tracing::debug!(effect, "No techniques found for effect");
    }
    for technique in techniques {
        runtime.set_technique_state(technique, enabled);
    }
}

/// Whether any technique belongs to `effect`
pub fn effect_exists<R: EffectRuntime + ?Sized>(runtime: &R, effect: &str) -> bool {
    runtime
        .techniques(None)
        .into_iter()
        .any(|technique| runtime.technique_effect_name(technique) == effect)
}

/// Sorted, de-duplicated effect names known to the runtime
pub fn effect_names<R: EffectRuntime + ?Sized>(runtime: &R) -> Vec<String> {
    let mut names: Vec<String> = runtime
        .techniques(None)
        .into_iter()
        .map(|technique| runtime.technique_effect_name(technique))
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension() {
        assert_eq!(UniformType::scalar(BaseType::Float).dimension(), 1);
        assert_eq!(UniformType::vector(BaseType::Float, 3).dimension(), 3);

        let matrix = UniformType {
            base: BaseType::Float,
            rows: 2,
            cols: 2,
            array_length: 0,
        };
        assert_eq!(matrix.dimension(), 4);

        let array = UniformType {
            base: BaseType::Int,
            rows: 1,
            cols: 1,
            array_length: 6,
        };
        assert_eq!(array.dimension(), 6);

        let empty = UniformType {
            base: BaseType::Int,
            rows: 0,
            cols: 0,
            array_length: 0,
        };
        assert_eq!(empty.dimension(), 1);
    }

    #[test]
    fn test_toggle_effect_targets_all_techniques_of_effect() {
        let mut runtime = MemoryRuntime::new();
        runtime.add_technique("Bloom", "BloomPass1");
        runtime.add_technique("Bloom", "BloomPass2");
        runtime.add_technique("Vignette", "Vignette");

        toggle_effect(&mut runtime, "Bloom", true);

        assert_eq!(runtime.is_effect_enabled("Bloom"), Some(true));
        assert_eq!(runtime.is_effect_enabled("Vignette"), Some(false));
        assert_eq!(runtime.technique_toggle_count(), 2);
    }

    #[test]
    fn test_entire_reshade_toggles_globally() {
        let mut runtime = MemoryRuntime::new();
        runtime.add_technique("Bloom", "Bloom");

        toggle_effect(&mut runtime, ENTIRE_RESHADE, false);

        assert!(!runtime.effects_enabled());
        assert_eq!(runtime.technique_toggle_count(), 0);
        assert_eq!(runtime.calls(), &[RuntimeCall::SetEffectsState(false)]);
    }

    #[test]
    fn test_effect_names_sorted_and_unique() {
        let mut runtime = MemoryRuntime::new();
        runtime.add_technique("Vignette", "Vignette");
        runtime.add_technique("Bloom", "BloomA");
        runtime.add_technique("Bloom", "BloomB");

        assert_eq!(effect_names(&runtime), vec!["Bloom", "Vignette"]);
        assert!(effect_exists(&runtime, "Bloom"));
        assert!(!effect_exists(&runtime, "Grain"));
    }
}
