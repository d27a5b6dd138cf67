//! In-memory effect runtime
//!
//! Keeps technique states and uniform values in plain vectors and records
//! every mutating call, so tests can assert on exactly what the engine asked
//! for. The CLI uses it as a stand-in for a real shader runtime.

use toggler_types::UniformHandle;

use super::{EffectRuntime, TechniqueHandle, UniformType};

/// A mutating call received by [`MemoryRuntime`]
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    SetTechniqueState {
        effect: String,
        technique: String,
        enabled: bool,
    },
    SetEffectsState(bool),
    SetUniformBool(UniformHandle, Vec<bool>),
    SetUniformInt(UniformHandle, Vec<i32>),
    SetUniformFloat(UniformHandle, Vec<f32>),
    SetUniformUInt(UniformHandle, Vec<u32>),
}

#[derive(Debug, Clone)]
struct Technique {
    effect: String,
    name: String,
    enabled: bool,
}

#[derive(Debug, Clone, Default)]
struct UniformData {
    bools: Vec<bool>,
    ints: Vec<i32>,
    floats: Vec<f32>,
    uints: Vec<u32>,
}

#[derive(Debug, Clone)]
struct UniformSlot {
    effect: String,
    name: String,
    ty: UniformType,
    data: UniformData,
}

#[derive(Debug, Clone)]
pub struct MemoryRuntime {
    techniques: Vec<Technique>,
    /// Handle N lives at index N - 1
    uniforms: Vec<UniformSlot>,
    effects_enabled: bool,
    calls: Vec<RuntimeCall>,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self {
            techniques: Vec::new(),
            uniforms: Vec::new(),
            effects_enabled: true,
            calls: Vec::new(),
        }
    }

    /// Register a technique (initially disabled) under `effect`
    pub fn add_technique(&mut self, effect: &str, technique: &str) -> TechniqueHandle {
        self.techniques.push(Technique {
            effect: effect.to_string(),
            name: technique.to_string(),
            enabled: false,
        });
        TechniqueHandle(self.techniques.len() as u64)
    }

    /// Register a uniform variable declared by `effect`
    pub fn add_uniform(&mut self, effect: &str, name: &str, ty: UniformType) -> UniformHandle {
        self.uniforms.push(UniformSlot {
            effect: effect.to_string(),
            name: name.to_string(),
            ty,
            data: UniformData::default(),
        });
        UniformHandle(self.uniforms.len() as u64)
    }

    pub fn calls(&self) -> &[RuntimeCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RuntimeCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn effects_enabled(&self) -> bool {
        self.effects_enabled
    }

    /// `Some(true)` if any technique of `effect` is enabled, `None` if the
    /// effect is unknown
    pub fn is_effect_enabled(&self, effect: &str) -> Option<bool> {
        let mut found = false;
        for technique in self.techniques.iter().filter(|t| t.effect == effect) {
            if technique.enabled {
                return Some(true);
            }
            found = true;
        }
        found.then_some(false)
    }

    /// Number of technique state changes requested so far
    pub fn technique_toggle_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, RuntimeCall::SetTechniqueState { .. }))
            .count()
    }

    /// States requested for `effect`'s techniques, in call order
    pub fn toggles_for(&self, effect: &str) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RuntimeCall::SetTechniqueState {
                    effect: e, enabled, ..
                } if e == effect => Some(*enabled),
                _ => None,
            })
            .collect()
    }

    /// Calls that wrote uniform values
    pub fn uniform_writes(&self) -> Vec<&RuntimeCall> {
        self.calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    RuntimeCall::SetUniformBool(..)
                        | RuntimeCall::SetUniformInt(..)
                        | RuntimeCall::SetUniformFloat(..)
                        | RuntimeCall::SetUniformUInt(..)
                )
            })
            .collect()
    }

    /// Overwrite a uniform's live float value without recording a call
    pub fn seed_floats(&mut self, handle: UniformHandle, values: &[f32]) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.floats = values.to_vec();
        }
    }

    pub fn seed_ints(&mut self, handle: UniformHandle, values: &[i32]) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.ints = values.to_vec();
        }
    }

    pub fn seed_uints(&mut self, handle: UniformHandle, values: &[u32]) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.uints = values.to_vec();
        }
    }

    pub fn seed_bool(&mut self, handle: UniformHandle, value: bool) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.bools = vec![value];
        }
    }

    /// Current float value of a uniform
    pub fn floats(&self, handle: UniformHandle) -> Vec<f32> {
        self.slot(handle)
            .map(|slot| slot.data.floats.clone())
            .unwrap_or_default()
    }

    fn slot(&self, handle: UniformHandle) -> Option<&UniformSlot> {
        let index = (handle.0 as usize).checked_sub(1)?;
        self.uniforms.get(index)
    }

    fn slot_mut(&mut self, handle: UniformHandle) -> Option<&mut UniformSlot> {
        let index = (handle.0 as usize).checked_sub(1)?;
        self.uniforms.get_mut(index)
    }

    fn technique(&self, technique: TechniqueHandle) -> Option<&Technique> {
        let index = (technique.0 as usize).checked_sub(1)?;
        self.techniques.get(index)
    }
}

fn copy_into<T: Copy + Default>(source: &[T], out: &mut [T]) {
    for (index, slot) in out.iter_mut().enumerate() {
        *slot = source.get(index).copied().unwrap_or_default();
    }
}

impl EffectRuntime for MemoryRuntime {
    fn techniques(&self, effect: Option<&str>) -> Vec<TechniqueHandle> {
        self.techniques
            .iter()
            .enumerate()
            .filter(|(_, t)| effect.is_none_or(|e| t.effect == e))
            .map(|(index, _)| TechniqueHandle(index as u64 + 1))
            .collect()
    }

    fn technique_effect_name(&self, technique: TechniqueHandle) -> String {
        self.technique(technique)
            .map(|t| t.effect.clone())
            .unwrap_or_default()
    }

    fn set_technique_state(&mut self, technique: TechniqueHandle, enabled: bool) {
        let Some(index) = (technique.0 as usize).checked_sub(1) else {
            return;
        };
        let Some(entry) = self.techniques.get_mut(index) else {
            return;
        };
        entry.enabled = enabled;
        self.calls.push(RuntimeCall::SetTechniqueState {
            effect: entry.effect.clone(),
            technique: entry.name.clone(),
            enabled,
        });
    }

    fn set_effects_state(&mut self, enabled: bool) {
        self.effects_enabled = enabled;
        self.calls.push(RuntimeCall::SetEffectsState(enabled));
    }

    fn find_uniform(&self, effect: &str, uniform: &str) -> Option<UniformHandle> {
        self.uniforms
            .iter()
            .position(|slot| slot.effect == effect && slot.name == uniform)
            .map(|index| UniformHandle(index as u64 + 1))
    }

    fn uniforms(&self, effect: &str) -> Vec<(String, UniformHandle)> {
        self.uniforms
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.effect == effect)
            .map(|(index, slot)| (slot.name.clone(), UniformHandle(index as u64 + 1)))
            .collect()
    }

    fn uniform_type(&self, handle: UniformHandle) -> Option<UniformType> {
        self.slot(handle).map(|slot| slot.ty)
    }

    fn set_uniform_bool(&mut self, handle: UniformHandle, values: &[bool]) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.bools = values.to_vec();
        }
        self.calls
            .push(RuntimeCall::SetUniformBool(handle, values.to_vec()));
    }

    fn set_uniform_int(&mut self, handle: UniformHandle, values: &[i32]) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.ints = values.to_vec();
        }
        self.calls.push(RuntimeCall::SetUniformInt(handle, values.to_vec()));
    }

    fn set_uniform_float(&mut self, handle: UniformHandle, values: &[f32]) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.floats = values.to_vec();
        }
        self.calls
            .push(RuntimeCall::SetUniformFloat(handle, values.to_vec()));
    }

    fn set_uniform_uint(&mut self, handle: UniformHandle, values: &[u32]) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.data.uints = values.to_vec();
        }
        self.calls
            .push(RuntimeCall::SetUniformUInt(handle, values.to_vec()));
    }

    fn get_uniform_bool(&self, handle: UniformHandle, out: &mut [bool]) {
        let source = self.slot(handle).map(|s| s.data.bools.as_slice()).unwrap_or(&[]);
        copy_into(source, out);
    }

    fn get_uniform_int(&self, handle: UniformHandle, out: &mut [i32]) {
        let source = self.slot(handle).map(|s| s.data.ints.as_slice()).unwrap_or(&[]);
        copy_into(source, out);
    }

    fn get_uniform_float(&self, handle: UniformHandle, out: &mut [f32]) {
        let source = self.slot(handle).map(|s| s.data.floats.as_slice()).unwrap_or(&[]);
        copy_into(source, out);
    }

    fn get_uniform_uint(&self, handle: UniformHandle, out: &mut [u32]) {
        let source = self.slot(handle).map(|s| s.data.uints.as_slice()).unwrap_or(&[]);
        copy_into(source, out);
    }
}
