//! Named, ordered hook chains folded over an evolving artifact.
//!
//! A phase is a name plus an artifact type `T` and a context type `C`. Every
//! handler registered for the phase receives the current artifact by value and
//! the shared context by reference, and returns the artifact for the next
//! handler. Registration order is the only ordering; there are no priorities.
//!
//! Phases run synchronously. A handler may run a *different* phase while it
//! executes (for example a per-field phase while composing an object's
//! fields) by reaching the engine through its context; running the same phase
//! re-entrantly is not supported.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{HookError, PipelineError, Result};

type HookFn<T, C> = dyn Fn(T, &C) -> std::result::Result<T, HookError> + Send + Sync;

struct HookEntry<T, C> {
    name: String,
    handler: Box<HookFn<T, C>>,
}

/// Hooks of one phase, type-erased so phases with different artifacts can
/// share one engine.
struct PhaseSlot {
    artifact: &'static str,
    context: &'static str,
    hooks: Box<dyn Any + Send + Sync>,
    names: Vec<String>,
}

impl PhaseSlot {
    fn new<T: 'static, C: 'static>() -> Self {
        Self {
            artifact: type_name::<T>(),
            context: type_name::<C>(),
            hooks: Box::new(Vec::<HookEntry<T, C>>::new()),
            names: Vec::new(),
        }
    }

    fn mismatch<T: 'static, C: 'static>(&self, phase: &str) -> PipelineError {
        PipelineError::PhaseType {
            phase: phase.to_string(),
            registered_artifact: self.artifact,
            registered_context: self.context,
            artifact: type_name::<T>(),
            context: type_name::<C>(),
        }
    }
}

/// Registry and runner for hook phases.
#[derive(Default)]
pub struct HookEngine {
    phases: HashMap<String, PhaseSlot>,
}

impl HookEngine {
    /// Create an engine with no phases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to `phase`.
    ///
    /// The first registration fixes the phase's artifact and context types;
    /// later registrations with other types fail with [`PipelineError::PhaseType`].
    /// Hook names must be unique within a phase.
    pub fn register<T, C, F>(&mut self, phase: &str, name: impl Into<String>, handler: F) -> Result<()>
    where
        T: 'static,
        C: 'static,
        F: Fn(T, &C) -> std::result::Result<T, HookError> + Send + Sync + 'static,
    {
        let name = name.into();
        let slot = self
            .phases
            .entry(phase.to_string())
            .or_insert_with(PhaseSlot::new::<T, C>);

        if slot.names.iter().any(|existing| *existing == name) {
            return Err(PipelineError::DuplicateHook {
                phase: phase.to_string(),
                hook: name,
            });
        }

        let Some(hooks) = slot.hooks.downcast_mut::<Vec<HookEntry<T, C>>>() else {
            return Err(slot.mismatch::<T, C>(phase));
        };

        debug!(phase, hook = %name, position = hooks.len(), "Registered hook");
        hooks.push(HookEntry {
            name: name.clone(),
            handler: Box::new(handler),
        });
        slot.names.push(name);
        Ok(())
    }

    /// Fold `initial` through every handler registered for `phase`, in order.
    ///
    /// A phase with no handlers returns `initial` unchanged. The first failing
    /// handler aborts the phase with [`PipelineError::HookFailed`].
    pub fn run<T: 'static, C: 'static>(&self, phase: &str, initial: T, context: &C) -> Result<T> {
        let Some(slot) = self.phases.get(phase) else {
            return Ok(initial);
        };

        let hooks = slot
            .hooks
            .downcast_ref::<Vec<HookEntry<T, C>>>()
            .ok_or_else(|| slot.mismatch::<T, C>(phase))?;

        debug!(phase, hooks = hooks.len(), "Running phase");
        let mut value = initial;
        for hook in hooks {
            value = (hook.handler)(value, context).map_err(|source| PipelineError::HookFailed {
                phase: phase.to_string(),
                hook: hook.name.clone(),
                source,
            })?;
        }
        Ok(value)
    }

    /// Names of the hooks registered for `phase`, in run order.
    pub fn hook_names(&self, phase: &str) -> &[String] {
        self.phases
            .get(phase)
            .map(|slot| slot.names.as_slice())
            .unwrap_or(&[])
    }

    /// Number of hooks registered for `phase`.
    pub fn hook_count(&self, phase: &str) -> usize {
        self.hook_names(phase).len()
    }
}

impl fmt::Debug for HookEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (phase, slot) in &self.phases {
            map.entry(phase, &(slot.artifact, slot.context, &slot.names));
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_run_folds_in_registration_order() {
        let mut engine = HookEngine::new();
        engine
            .register("build", "append_a", |mut v: Vec<&'static str>, _: &()| {
                v.push("a");
                Ok(v)
            })
            .unwrap();
        engine
            .register("build", "append_b", |mut v: Vec<&'static str>, _: &()| {
                v.push("b");
                Ok(v)
            })
            .unwrap();

        let out = engine.run("build", vec!["start"], &()).unwrap();
        assert_eq!(out, vec!["start", "a", "b"]);
        assert_eq!(engine.hook_names("build"), ["append_a", "append_b"]);
    }

    #[test]
    fn test_run_empty_phase_returns_initial() {
        let engine = HookEngine::new();
        assert_eq!(engine.run("nothing", 7u32, &()).unwrap(), 7);
    }

    #[test]
    fn test_handlers_see_context() {
        let mut engine = HookEngine::new();
        engine
            .register("scale", "multiply", |v: u64, factor: &u64| Ok(v * factor))
            .unwrap();
        engine
            .register("scale", "add", |v: u64, factor: &u64| Ok(v + factor))
            .unwrap();

        assert_eq!(engine.run("scale", 2u64, &10u64).unwrap(), 30);
    }

    #[test]
    fn test_failure_aborts_phase() {
        let mut engine = HookEngine::new();
        engine
            .register("build", "fails", |_: u32, _: &()| Err("boom".into()))
            .unwrap();
        engine
            .register("build", "never_runs", |_: u32, _: &()| -> std::result::Result<u32, HookError> {
                panic!("must not run after a failure")
            })
            .unwrap();

        let err = engine.run("build", 0u32, &()).unwrap_err();
        match err {
            PipelineError::HookFailed { phase, hook, source } => {
                assert_eq!(phase, "build");
                assert_eq!(hook, "fails");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_hook_name_rejected() {
        let mut engine = HookEngine::new();
        engine.register("build", "same", |v: u8, _: &()| Ok(v)).unwrap();
        let err = engine
            .register("build", "same", |v: u8, _: &()| Ok(v))
            .unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateHook { .. }));
        assert_eq!(engine.hook_count("build"), 1);
    }

    #[test]
    fn test_phase_type_mismatch() {
        let mut engine = HookEngine::new();
        engine.register("build", "numbers", |v: u8, _: &()| Ok(v)).unwrap();

        let err = engine
            .register("build", "strings", |v: String, _: &()| Ok(v))
            .unwrap_err();
        assert!(matches!(err, PipelineError::PhaseType { .. }));

        let err = engine.run("build", String::new(), &()).unwrap_err();
        assert!(matches!(err, PipelineError::PhaseType { .. }));
    }

    #[test]
    fn test_phase_context_mismatch_names_context() {
        struct Other;

        let mut engine = HookEngine::new();
        engine.register("build", "unit", |v: u8, _: &()| Ok(v)).unwrap();

        let err = engine
            .register("build", "other", |v: u8, _: &Other| Ok(v))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Other"), "{message}");
        assert!(message.contains("context ()"), "{message}");

        let err = engine.run("build", 1u8, &Other).unwrap_err();
        match err {
            PipelineError::PhaseType {
                registered_artifact,
                registered_context,
                artifact,
                context,
                ..
            } => {
                assert_eq!(registered_artifact, "u8");
                assert_eq!(artifact, "u8");
                assert_eq!(registered_context, "()");
                assert!(context.ends_with("Other"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(engine.hook_count("build"), 1);
    }

    #[test]
    fn test_nested_different_phase() {
        struct Ctx {
            engine: Arc<HookEngine>,
        }

        let mut inner = HookEngine::new();
        inner
            .register("field", "suffix", |v: String, _: &()| Ok(format!("{v}!")))
            .unwrap();
        let inner = Arc::new(inner);

        let mut outer = HookEngine::new();
        outer
            .register("object", "fields", |mut v: Vec<String>, ctx: &Ctx| {
                let field = ctx.engine.run("field", String::from("id"), &())?;
                v.push(field);
                Ok(v)
            })
            .unwrap();

        let out = outer
            .run("object", Vec::<String>::new(), &Ctx { engine: inner })
            .unwrap();
        assert_eq!(out, vec!["id!".to_string()]);
    }
}
