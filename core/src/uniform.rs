//! Uniform sync
//!
//! Pushes the values cached on a rule's [`EffectUniform`]s to the live runtime,
//! and pulls live values back for editing. Handles are resolved lazily by
//! `(effect, uniform name)` because runtime handles do not survive a reload.

use toggler_types::{EffectUniform, MAX_UNIFORM_ELEMENTS, UniformHandle, UniformKind, UniformValue};

use crate::runtime::{BaseType, EffectRuntime};

/// Resolve the uniform's handle if it has not been looked up yet.
fn resolve<R: EffectRuntime + ?Sized>(
    runtime: &R,
    effect: &str,
    uniform: &mut EffectUniform,
) -> Option<UniformHandle> {
    if uniform.handle.is_resolved() {
        return Some(uniform.handle);
    }
    let handle = runtime.find_uniform(effect, &uniform.name)?;
    uniform.handle = handle;
    Some(handle)
}

fn assert_element_count(count: usize) {
    assert!(
        (1..=MAX_UNIFORM_ELEMENTS).contains(&count),
        "uniform values carry 1 to {MAX_UNIFORM_ELEMENTS} elements, got {count}"
    );
}

/// Write one typed value through the matching setter.
///
/// # Panics
/// If the value carries zero or more than four elements. Preset decoding
/// rejects such documents, so reaching this is a programming error.
pub fn push_value<R: EffectRuntime + ?Sized>(
    runtime: &mut R,
    handle: UniformHandle,
    value: UniformValue<'_>,
) {
    assert_element_count(value.len());
    match value {
        UniformValue::Bool(b) => runtime.set_uniform_bool(handle, &[b]),
        UniformValue::Int(values) => runtime.set_uniform_int(handle, values),
        UniformValue::Float(values) => runtime.set_uniform_float(handle, values),
        UniformValue::UInt(values) => runtime.set_uniform_uint(handle, values),
    }
}

/// Push a uniform's cached value to the runtime.
///
/// Returns `false` when nothing was written: the uniform could not be found
/// in `effect`, or it holds no value.
pub fn push<R: EffectRuntime + ?Sized>(
    runtime: &mut R,
    effect: &str,
    uniform: &mut EffectUniform,
) -> bool {
    let Some(handle) = resolve(runtime, effect, uniform) else {
        tracing::debug!(effect, uniform = %uniform.name, "Uniform not found, skipping");
        return false;
    };
    let Some(value) = uniform.value() else {
        tracing::trace!(effect, uniform = %uniform.name, "Uniform has no value");
        return false;
    };
    push_value(runtime, handle, value);
    true
}

/// Push every uniform override of a rule
pub fn push_all<R: EffectRuntime + ?Sized>(
    runtime: &mut R,
    effect: &str,
    uniforms: &mut [EffectUniform],
) {
    for uniform in uniforms {
        push(runtime, effect, uniform);
    }
}

/// Copy the uniform's stored value into its staging copy.
pub fn stage_stored(uniform: &mut EffectUniform) {
    let stored_bool = uniform.bool();
    let staged = &mut uniform.staged;
    for (slot, value) in staged.float_values.iter_mut().zip(&uniform.float_values) {
        *slot = *value;
    }
    for (slot, value) in staged.int_values.iter_mut().zip(&uniform.int_values) {
        *slot = *value;
    }
    for (slot, value) in staged.uint_values.iter_mut().zip(&uniform.uint_values) {
        *slot = *value;
    }
    if let Some(b) = stored_bool {
        staged.bool_value = b;
    }
    uniform.prefetched = true;
}

/// Fill the staging copy once per edit session.
///
/// Uniforms that already carry a value stage that value; new ones read the
/// live value from the runtime. Later calls are no-ops until `prefetched` is
/// cleared, so an unapplied edit is never overwritten on redraw.
pub fn prefetch<R: EffectRuntime + ?Sized>(
    runtime: &R,
    effect: &str,
    uniform: &mut EffectUniform,
) -> bool {
    if uniform.prefetched {
        return false;
    }
    if uniform.value().is_some() {
        stage_stored(uniform);
        return true;
    }

    let Some(handle) = resolve(runtime, effect, uniform) else {
        return false;
    };
    let Some(ty) = runtime.uniform_type(handle) else {
        return false;
    };

    let count = ty.dimension().min(MAX_UNIFORM_ELEMENTS);
    let staged = &mut uniform.staged;
    match ty.base {
        BaseType::Float => runtime.get_uniform_float(handle, &mut staged.float_values[..count]),
        BaseType::Int => runtime.get_uniform_int(handle, &mut staged.int_values[..count]),
        BaseType::UInt => runtime.get_uniform_uint(handle, &mut staged.uint_values[..count]),
        BaseType::Bool => {
            let mut value = [false];
            runtime.get_uniform_bool(handle, &mut value);
            staged.bool_value = value[0];
        }
        BaseType::Unsupported => {
            tracing::trace!(effect, uniform = %uniform.name, "Unsupported uniform type");
        }
    }
    uniform.prefetched = true;
    true
}

/// Apply the first `count` staged elements to the `kind` slot.
///
/// # Panics
/// If `count` is outside `1..=4`.
pub fn commit_staged(uniform: &mut EffectUniform, kind: UniformKind, count: usize) {
    assert_element_count(count);
    let staged = uniform.staged;
    match kind {
        UniformKind::Bool => uniform.set_bool(staged.bool_value),
        UniformKind::Int => uniform.set_ints(&staged.int_values[..count]),
        UniformKind::Float => uniform.set_floats(&staged.float_values[..count]),
        UniformKind::UInt => uniform.set_uints(&staged.uint_values[..count]),
    }
}

/// Snapshot every supported uniform of `effect` with its live value.
pub fn capture<R: EffectRuntime + ?Sized>(runtime: &R, effect: &str) -> Vec<EffectUniform> {
    let mut captured = Vec::new();

    for (name, handle) in runtime.uniforms(effect) {
        let Some(ty) = runtime.uniform_type(handle) else {
            continue;
        };
        let count = ty.dimension().min(MAX_UNIFORM_ELEMENTS);
        let mut uniform = EffectUniform::new(name);
        uniform.handle = handle;

        match ty.base {
            BaseType::Float => {
                let mut values = [0.0f32; MAX_UNIFORM_ELEMENTS];
                runtime.get_uniform_float(handle, &mut values[..count]);
                uniform.set_floats(&values[..count]);
            }
            BaseType::Int => {
                let mut values = [0i32; MAX_UNIFORM_ELEMENTS];
                runtime.get_uniform_int(handle, &mut values[..count]);
                uniform.set_ints(&values[..count]);
            }
            BaseType::UInt => {
                let mut values = [0u32; MAX_UNIFORM_ELEMENTS];
                runtime.get_uniform_uint(handle, &mut values[..count]);
                uniform.set_uints(&values[..count]);
            }
            BaseType::Bool => {
                let mut value = [false];
                runtime.get_uniform_bool(handle, &mut value);
                uniform.set_bool(value[0]);
            }
            BaseType::Unsupported => {
                tracing::trace!(effect, uniform = %uniform.name, "Skipping unsupported uniform");
                continue;
            }
        }
        captured.push(uniform);
    }

    captured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MemoryRuntime, RuntimeCall, UniformType};

    fn runtime_with(effect: &str, name: &str, ty: UniformType) -> (MemoryRuntime, UniformHandle) {
        let mut runtime = MemoryRuntime::new();
        runtime.add_technique(effect, effect);
        let handle = runtime.add_uniform(effect, name, ty);
        (runtime, handle)
    }

    #[test]
    fn test_float3_push_uses_float_setter_only() {
        let (mut runtime, handle) =
            runtime_with("Tonemap", "Tint", UniformType::vector(BaseType::Float, 3));
        let mut uniform = EffectUniform::with_floats("Tint", &[0.5, 0.25, 1.0]);

        assert!(push(&mut runtime, "Tonemap", &mut uniform));

        assert_eq!(
            runtime.calls(),
            &[RuntimeCall::SetUniformFloat(handle, vec![0.5, 0.25, 1.0])]
        );
    }

    #[test]
    fn test_handle_resolved_lazily_and_cached() {
        let (mut runtime, handle) =
            runtime_with("Tonemap", "Exposure", UniformType::scalar(BaseType::Float));
        let mut uniform = EffectUniform::with_floats("Exposure", &[1.5]);
        assert!(!uniform.handle.is_resolved());

        push(&mut runtime, "Tonemap", &mut uniform);
        assert_eq!(uniform.handle, handle);

        push(&mut runtime, "Tonemap", &mut uniform);
        assert_eq!(runtime.uniform_writes().len(), 2);
    }

    #[test]
    fn test_unknown_uniform_is_skipped() {
        let (mut runtime, _) =
            runtime_with("Tonemap", "Exposure", UniformType::scalar(BaseType::Float));
        let mut uniform = EffectUniform::with_floats("Missing", &[1.0]);

        assert!(!push(&mut runtime, "Tonemap", &mut uniform));
        assert!(runtime.calls().is_empty());
    }

    #[test]
    fn test_uniform_without_value_writes_nothing() {
        let (mut runtime, _) =
            runtime_with("Tonemap", "Exposure", UniformType::scalar(BaseType::Float));
        let mut uniform = EffectUniform::new("Exposure");

        assert!(!push(&mut runtime, "Tonemap", &mut uniform));
        assert!(runtime.calls().is_empty());
    }

    #[test]
    fn test_bool_push() {
        let (mut runtime, handle) =
            runtime_with("Grain", "Animate", UniformType::scalar(BaseType::Bool));
        let mut uniform = EffectUniform::with_bool("Animate", false);

        push(&mut runtime, "Grain", &mut uniform);
        assert_eq!(
            runtime.calls(),
            &[RuntimeCall::SetUniformBool(handle, vec![false])]
        );
    }

    #[test]
    #[should_panic(expected = "1 to 4 elements")]
    fn test_oversized_value_fails_fast() {
        let (mut runtime, handle) =
            runtime_with("Grain", "Weights", UniformType::vector(BaseType::Int, 4));
        push_value(&mut runtime, handle, UniformValue::Int(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_prefetch_runs_once_per_session() {
        let (mut runtime, handle) =
            runtime_with("Tonemap", "Tint", UniformType::vector(BaseType::Float, 3));
        runtime.seed_floats(handle, &[0.1, 0.2, 0.3]);
        let mut uniform = EffectUniform::new("Tint");

        assert!(prefetch(&runtime, "Tonemap", &mut uniform));
        assert_eq!(uniform.staged.float_values, [0.1, 0.2, 0.3, 0.0]);

        // A staged edit must survive a later prefetch even if the live value moved
        uniform.staged.float_values[0] = 0.9;
        runtime.seed_floats(handle, &[0.7, 0.7, 0.7]);
        assert!(!prefetch(&runtime, "Tonemap", &mut uniform));
        assert_eq!(uniform.staged.float_values[0], 0.9);
    }

    #[test]
    fn test_prefetch_stages_stored_value_before_live() {
        let (mut runtime, handle) =
            runtime_with("Sharpen", "Radius", UniformType::scalar(BaseType::Int));
        runtime.seed_ints(handle, &[9]);
        let mut uniform = EffectUniform::with_ints("Radius", &[2]);

        prefetch(&runtime, "Sharpen", &mut uniform);
        assert_eq!(uniform.staged.int_values[0], 2);
        assert!(uniform.prefetched);
    }

    #[test]
    fn test_commit_staged() {
        let mut uniform = EffectUniform::new("Tint");
        uniform.staged.float_values = [0.3, 0.6, 0.9, 1.0];

        commit_staged(&mut uniform, UniformKind::Float, 3);
        assert_eq!(uniform.float_values, vec![0.3, 0.6, 0.9]);

        uniform.staged.bool_value = true;
        commit_staged(&mut uniform, UniformKind::Bool, 1);
        assert_eq!(uniform.bool(), Some(true));
    }

    #[test]
    fn test_capture_reads_by_type_and_dimension() {
        let mut runtime = MemoryRuntime::new();
        runtime.add_technique("Lut", "Lut");
        let tint = runtime.add_uniform("Lut", "Tint", UniformType::vector(BaseType::Float, 3));
        let steps = runtime.add_uniform("Lut", "Steps", UniformType::scalar(BaseType::UInt));
        let enabled = runtime.add_uniform("Lut", "Enabled", UniformType::scalar(BaseType::Bool));
        runtime.add_uniform("Lut", "Sampler", UniformType::scalar(BaseType::Unsupported));
        let wide = runtime.add_uniform(
            "Lut",
            "Weights",
            UniformType {
                base: BaseType::Int,
                rows: 1,
                cols: 1,
                array_length: 8,
            },
        );
        runtime.seed_floats(tint, &[1.0, 0.5, 0.25]);
        runtime.seed_uints(steps, &[32]);
        runtime.seed_bool(enabled, true);
        runtime.seed_ints(wide, &[1, 2, 3, 4, 5, 6, 7, 8]);

        let captured = capture(&runtime, "Lut");

        assert_eq!(captured.len(), 4);
        assert_eq!(captured[0].float_values, vec![1.0, 0.5, 0.25]);
        assert_eq!(captured[1].uint_values, vec![32]);
        assert_eq!(captured[2].bool(), Some(true));
        assert_eq!(captured[3].int_values, vec![1, 2, 3, 4]);
        assert!(captured.iter().all(|u| u.handle.is_resolved()));
    }
}
