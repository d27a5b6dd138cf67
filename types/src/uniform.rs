//! Uniform override types
//!
//! An [`EffectUniform`] captures one shader parameter value that a rule pushes
//! to the effect runtime whenever it is evaluated.

use serde::{Deserialize, Serialize};

/// Maximum number of elements a uniform value may carry.
pub const MAX_UNIFORM_ELEMENTS: usize = 4;

/// `bool_value` sentinel meaning "no bool value stored".
pub const UNSET_BOOL: u8 = u8::MAX;

/// Opaque runtime handle for a uniform variable. `0` means unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct UniformHandle(pub u64);

impl UniformHandle {
    pub const UNRESOLVED: Self = Self(0);

    pub fn is_resolved(&self) -> bool {
        self.0 != 0
    }
}

/// Typed slot a uniform value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Bool,
    Int,
    Float,
    UInt,
}

/// Borrowed view of whichever slot is populated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    Bool(bool),
    Int(&'a [i32]),
    Float(&'a [f32]),
    UInt(&'a [u32]),
}

impl UniformValue<'_> {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Bool(_) => UniformKind::Bool,
            Self::Int(_) => UniformKind::Int,
            Self::Float(_) => UniformKind::Float,
            Self::UInt(_) => UniformKind::UInt,
        }
    }

    /// Number of elements carried by the value
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(_) => 1,
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::UInt(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Editable copy of a uniform's live value, filled once per edit session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StagedValues {
    pub bool_value: bool,
    pub int_values: [i32; MAX_UNIFORM_ELEMENTS],
    pub float_values: [f32; MAX_UNIFORM_ELEMENTS],
    pub uint_values: [u32; MAX_UNIFORM_ELEMENTS],
}

/// One shader parameter override attached to a rule.
///
/// Exactly one of the four value slots is expected to be populated; the
/// populated slot determines the parameter's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectUniform {
    #[serde(rename = "UniformName", default)]
    pub name: String,

    /// Resolved lazily on first push
    #[serde(skip)]
    pub handle: UniformHandle,

    /// 0 or 1 when set, anything else means unset
    #[serde(rename = "BoolValue", default = "unset_bool")]
    pub bool_value: u8,

    #[serde(rename = "IntValues", default)]
    pub int_values: Vec<i32>,

    #[serde(rename = "FloatValues", default)]
    pub float_values: Vec<f32>,

    #[serde(rename = "UIntValues", default)]
    pub uint_values: Vec<u32>,

    /// Written for compatibility, always reset on read
    #[serde(rename = "Prefetched", default, skip_deserializing)]
    pub prefetched: bool,

    #[serde(skip)]
    pub staged: StagedValues,
}

fn unset_bool() -> u8 {
    UNSET_BOOL
}

impl Default for EffectUniform {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl EffectUniform {
    /// Create a uniform with no value stored.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: UniformHandle::UNRESOLVED,
            bool_value: UNSET_BOOL,
            int_values: Vec::new(),
            float_values: Vec::new(),
            uint_values: Vec::new(),
            prefetched: false,
            staged: StagedValues::default(),
        }
    }

    pub fn with_bool(name: impl Into<String>, value: bool) -> Self {
        let mut uniform = Self::new(name);
        uniform.set_bool(value);
        uniform
    }

    pub fn with_ints(name: impl Into<String>, values: &[i32]) -> Self {
        let mut uniform = Self::new(name);
        uniform.set_ints(values);
        uniform
    }

    pub fn with_floats(name: impl Into<String>, values: &[f32]) -> Self {
        let mut uniform = Self::new(name);
        uniform.set_floats(values);
        uniform
    }

    pub fn with_uints(name: impl Into<String>, values: &[u32]) -> Self {
        let mut uniform = Self::new(name);
        uniform.set_uints(values);
        uniform
    }

    pub fn set_bool(&mut self, value: bool) {
        self.bool_value = u8::from(value);
    }

    /// Overwrite the leading elements of the int slot, growing it if needed.
    pub fn set_ints(&mut self, values: &[i32]) {
        overwrite_prefix(&mut self.int_values, values);
    }

    pub fn set_floats(&mut self, values: &[f32]) {
        overwrite_prefix(&mut self.float_values, values);
    }

    pub fn set_uints(&mut self, values: &[u32]) {
        overwrite_prefix(&mut self.uint_values, values);
    }

    /// The stored bool, if the bool slot holds a valid 0/1 value
    pub fn bool(&self) -> Option<bool> {
        match self.bool_value {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    /// The populated slot, checked in float, int, uint, bool order.
    pub fn value(&self) -> Option<UniformValue<'_>> {
        if !self.float_values.is_empty() {
            Some(UniformValue::Float(&self.float_values))
        } else if !self.int_values.is_empty() {
            Some(UniformValue::Int(&self.int_values))
        } else if !self.uint_values.is_empty() {
            Some(UniformValue::UInt(&self.uint_values))
        } else {
            self.bool().map(UniformValue::Bool)
        }
    }

    /// Number of populated slots. Well-formed uniforms have exactly one.
    pub fn populated_slots(&self) -> usize {
        [
            !self.float_values.is_empty(),
            !self.int_values.is_empty(),
            !self.uint_values.is_empty(),
            self.bool().is_some(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    /// Length of the longest array slot
    pub fn max_len(&self) -> usize {
        self.float_values
            .len()
            .max(self.int_values.len())
            .max(self.uint_values.len())
    }
}

fn overwrite_prefix<T: Copy>(slot: &mut Vec<T>, values: &[T]) {
    if values.len() > slot.len() {
        slot.resize(values.len(), values[0]);
    }
    slot[..values.len()].copy_from_slice(values);
}
