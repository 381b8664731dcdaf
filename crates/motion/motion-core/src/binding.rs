//! Target bindings: where blended values go.
//!
//! Sinks are resolved once at bind time into a capability object; nothing is
//! looked up by name per tick. Three variants ship with the crate:
//! - [`DirectFieldBinding`]: a shared typed field
//! - [`ShaderParameterBinding`]: a named global in [`ShaderGlobals`]
//! - [`ComponentPropertyBinding`]: a property slot on a [`PropertyHost`]
//!
//! Targets are held weakly, so a destroyed target simply becomes invalid.
//! [`TargetBinding`] wraps a sink with the once-per-lifetime default capture
//! and restores that default on teardown.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;

use crate::error::MotionError;
use crate::value::{MotionValue, Value, ValueKind};

/// Typed output sink.
pub trait TargetSink<V: MotionValue> {
    fn describe(&self) -> String;
    fn is_valid(&self) -> bool;
    fn read(&self) -> Option<V>;
    fn write(&mut self, value: V) -> Result<(), MotionError>;
}

/// Untyped output sink, as produced by a [`TargetResolver`].
pub trait ValueSink {
    fn describe(&self) -> String;
    fn is_valid(&self) -> bool;
    fn read(&self) -> Option<Value>;
    fn write(&mut self, value: Value) -> Result<(), MotionError>;
}

/// Resolves canonical target paths to sinks. Adapters implement this and
/// hand it to the director when binding a loaded timeline.
pub trait TargetResolver {
    fn resolve(&mut self, path: &str, kind: ValueKind) -> Option<Box<dyn ValueSink>>;
}

/// Adapts a [`ValueSink`] to any typed sink, checking kinds on read.
pub struct DynamicSink<V> {
    inner: Box<dyn ValueSink>,
    _kind: PhantomData<V>,
}

impl<V: MotionValue> DynamicSink<V> {
    pub fn new(inner: Box<dyn ValueSink>) -> Self {
        Self {
            inner,
            _kind: PhantomData,
        }
    }
}

impl<V: MotionValue> TargetSink<V> for DynamicSink<V> {
    fn describe(&self) -> String {
        self.inner.describe()
    }
    fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }
    fn read(&self) -> Option<V> {
        let value = self.inner.read()?;
        if value.kind() != V::KIND {
            let err = MotionError::KindMismatch {
                expected: V::KIND,
                found: value.kind(),
            };
            log::warn!("{}: {err}", self.inner.describe());
            return None;
        }
        V::from_value(&value)
    }
    fn write(&mut self, value: V) -> Result<(), MotionError> {
        self.inner.write(value.to_value())
    }
}

/// Binding straight to a shared field.
pub struct DirectFieldBinding<V> {
    label: String,
    field: Weak<RefCell<V>>,
}

impl<V: MotionValue> DirectFieldBinding<V> {
    pub fn new(label: impl Into<String>, field: &Rc<RefCell<V>>) -> Self {
        Self {
            label: label.into(),
            field: Rc::downgrade(field),
        }
    }
}

impl<V: MotionValue> TargetSink<V> for DirectFieldBinding<V> {
    fn describe(&self) -> String {
        self.label.clone()
    }
    fn is_valid(&self) -> bool {
        self.field.strong_count() > 0
    }
    fn read(&self) -> Option<V> {
        let field = self.field.upgrade()?;
        let value = *field.borrow();
        Some(value)
    }
    fn write(&mut self, value: V) -> Result<(), MotionError> {
        let field = self.field.upgrade().ok_or_else(|| MotionError::InvalidTarget {
            target: self.label.clone(),
        })?;
        *field.borrow_mut() = value;
        Ok(())
    }
}

/// Global shader parameters addressed by id after a one-time name lookup.
#[derive(Debug, Default)]
pub struct ShaderGlobals {
    ids: HashMap<String, usize>,
    values: Vec<Option<Value>>,
}

impl ShaderGlobals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable id for `name`, allocating a slot on first use.
    pub fn property_to_id(&mut self, name: &str) -> usize {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.values.len();
        self.values.push(None);
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: usize) -> Option<&Value> {
        self.values.get(id).and_then(|v| v.as_ref())
    }

    pub fn set(&mut self, id: usize, value: Value) -> bool {
        match self.values.get_mut(id) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.ids.get(name).and_then(|id| self.get(*id))
    }
}

/// Binding to a global shader parameter.
pub struct ShaderParameterBinding {
    globals: Weak<RefCell<ShaderGlobals>>,
    name: String,
    id: usize,
}

impl ShaderParameterBinding {
    pub fn bind(globals: &Rc<RefCell<ShaderGlobals>>, name: impl Into<String>) -> Self {
        let name = name.into();
        let id = globals.borrow_mut().property_to_id(&name);
        Self {
            globals: Rc::downgrade(globals),
            name,
            id,
        }
    }
}

impl ValueSink for ShaderParameterBinding {
    fn describe(&self) -> String {
        format!("shader:{}", self.name)
    }
    fn is_valid(&self) -> bool {
        self.globals.strong_count() > 0
    }
    fn read(&self) -> Option<Value> {
        let globals = self.globals.upgrade()?;
        let value = globals.borrow().get(self.id).cloned();
        value
    }
    fn write(&mut self, value: Value) -> Result<(), MotionError> {
        let globals = self.globals.upgrade().ok_or_else(|| MotionError::InvalidTarget {
            target: self.describe(),
        })?;
        let ok = globals.borrow_mut().set(self.id, value);
        if ok {
            Ok(())
        } else {
            Err(MotionError::InvalidTarget {
                target: self.describe(),
            })
        }
    }
}

/// A component exposing animatable properties through numbered slots.
pub trait PropertyHost {
    fn host_name(&self) -> &str;

    /// A host may outlive its logical lifetime (e.g. pending destruction).
    fn is_alive(&self) -> bool {
        true
    }

    fn property_slot(&self, property: &str) -> Option<usize>;
    fn get_property(&self, slot: usize) -> Option<Value>;
    fn set_property(&mut self, slot: usize, value: Value) -> bool;
}

/// Binding to a property on a component, resolved to a slot at bind time.
pub struct ComponentPropertyBinding<H> {
    host: Weak<RefCell<H>>,
    label: String,
    slot: usize,
}

impl<H: PropertyHost> ComponentPropertyBinding<H> {
    pub fn bind(host: &Rc<RefCell<H>>, property: &str) -> Result<Self, MotionError> {
        let h = host.borrow();
        let label = format!("{}.{}", h.host_name(), property);
        let slot = h
            .property_slot(property)
            .ok_or_else(|| MotionError::UnknownProperty {
                target: h.host_name().to_string(),
                property: property.to_string(),
            })?;
        Ok(Self {
            host: Rc::downgrade(host),
            label,
            slot,
        })
    }
}

impl<H: PropertyHost> ValueSink for ComponentPropertyBinding<H> {
    fn describe(&self) -> String {
        self.label.clone()
    }
    fn is_valid(&self) -> bool {
        match self.host.upgrade() {
            Some(host) => {
                let alive = host.borrow().is_alive();
                alive
            }
            None => false,
        }
    }
    fn read(&self) -> Option<Value> {
        let host = self.host.upgrade()?;
        let value = host.borrow().get_property(self.slot);
        value
    }
    fn write(&mut self, value: Value) -> Result<(), MotionError> {
        let lost = || MotionError::InvalidTarget {
            target: self.label.clone(),
        };
        let host = self.host.upgrade().ok_or_else(lost)?;
        let mut host = host.borrow_mut();
        if !host.is_alive() || !host.set_property(self.slot, value) {
            return Err(lost());
        }
        Ok(())
    }
}

/// Outcome of one [`TargetBinding::apply`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// The target is gone; `first` is set the first time this is observed.
    TargetLost { first: bool },
    /// The binding was already torn down.
    Released,
}

/// A sink plus the default value captured on the first frame.
pub struct TargetBinding<V: MotionValue> {
    sink: Box<dyn TargetSink<V>>,
    default: Option<V>,
    captured: bool,
    report_once: bool,
    lost_reported: bool,
    released: bool,
}

impl<V: MotionValue> TargetBinding<V> {
    pub fn new(sink: impl TargetSink<V> + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            default: None,
            captured: false,
            report_once: true,
            lost_reported: false,
            released: false,
        }
    }

    pub fn from_value_sink(sink: Box<dyn ValueSink>) -> Self {
        Self::new(DynamicSink::<V>::new(sink))
    }

    /// Log a lost target every tick instead of once.
    #[must_use]
    pub fn with_report_once(mut self, once: bool) -> Self {
        self.report_once = once;
        self
    }

    pub fn describe(&self) -> String {
        self.sink.describe()
    }

    pub fn is_valid(&self) -> bool {
        !self.released && self.sink.is_valid()
    }

    /// Current value held by the target, if readable.
    pub fn current(&self) -> Option<V> {
        if self.is_valid() {
            self.sink.read()
        } else {
            None
        }
    }

    /// Capture the target's current value as the default. Only the first
    /// call reads the target; later calls return what it found, even `None`.
    pub fn capture_default(&mut self) -> Option<V> {
        if !self.captured && !self.released {
            self.captured = true;
            self.default = self.current();
        }
        self.default
    }

    pub fn default_value(&self) -> Option<V> {
        self.default
    }

    /// Write `value`, skipping (without failing) when the target is gone.
    pub fn apply(&mut self, value: V) -> WriteStatus {
        if self.released {
            return WriteStatus::Released;
        }
        let result = if self.sink.is_valid() {
            self.sink.write(value)
        } else {
            Err(MotionError::InvalidTarget {
                target: self.sink.describe(),
            })
        };
        match result {
            Ok(()) => WriteStatus::Written,
            Err(err) => {
                let first = !self.lost_reported;
                if first || !self.report_once {
                    log::warn!("skipping write: {err}");
                }
                self.lost_reported = true;
                WriteStatus::TargetLost { first }
            }
        }
    }

    /// Tear down: restore the captured default if the target still exists.
    /// Returns whether a restore was written. Idempotent.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        match self.default {
            Some(default) if self.sink.is_valid() => self.sink.write(default).is_ok(),
            _ => false,
        }
    }
}

impl<V: MotionValue> Drop for TargetBinding<V> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Panel {
        alive: bool,
        alpha: f32,
    }

    impl PropertyHost for Panel {
        fn host_name(&self) -> &str {
            "panel"
        }
        fn is_alive(&self) -> bool {
            self.alive
        }
        fn property_slot(&self, property: &str) -> Option<usize> {
            (property == "alpha").then_some(0)
        }
        fn get_property(&self, _slot: usize) -> Option<Value> {
            Some(Value::Float(self.alpha))
        }
        fn set_property(&mut self, _slot: usize, value: Value) -> bool {
            match value {
                Value::Float(a) => {
                    self.alpha = a;
                    true
                }
                _ => false,
            }
        }
    }

    #[test]
    fn default_is_captured_once_and_restored() {
        let field = Rc::new(RefCell::new(2.0f32));
        let mut binding = TargetBinding::new(DirectFieldBinding::new("x", &field));
        assert_eq!(binding.capture_default(), Some(2.0));
        assert_eq!(binding.apply(5.0), WriteStatus::Written);
        assert_eq!(binding.capture_default(), Some(2.0));
        assert_eq!(*field.borrow(), 5.0);
        assert!(binding.release());
        assert_eq!(*field.borrow(), 2.0);
        assert!(!binding.release());
        assert_eq!(binding.apply(9.0), WriteStatus::Released);
    }

    #[test]
    fn drop_restores_default() {
        let field = Rc::new(RefCell::new([1.0f32, 2.0]));
        {
            let mut binding = TargetBinding::new(DirectFieldBinding::new("v", &field));
            binding.capture_default();
            binding.apply([7.0, 7.0]);
        }
        assert_eq!(*field.borrow(), [1.0, 2.0]);
    }

    #[test]
    fn lost_target_is_reported_once() {
        let field = Rc::new(RefCell::new(0.0f32));
        let mut binding = TargetBinding::new(DirectFieldBinding::new("gone", &field));
        binding.capture_default();
        drop(field);
        assert_eq!(binding.apply(1.0), WriteStatus::TargetLost { first: true });
        assert_eq!(binding.apply(1.0), WriteStatus::TargetLost { first: false });
        assert!(!binding.release());
    }

    #[test]
    fn shader_binding_resolves_name_once() {
        let globals = Rc::new(RefCell::new(ShaderGlobals::new()));
        let sink = ShaderParameterBinding::bind(&globals, "_Glow");
        let mut binding = TargetBinding::<f32>::from_value_sink(Box::new(sink));
        assert_eq!(binding.capture_default(), None);
        assert_eq!(binding.apply(0.5), WriteStatus::Written);
        assert_eq!(globals.borrow().get_by_name("_Glow"), Some(&Value::Float(0.5)));
        assert_eq!(globals.borrow_mut().property_to_id("_Glow"), 0);
    }

    #[test]
    fn unreadable_default_is_not_captured_later() {
        let globals = Rc::new(RefCell::new(ShaderGlobals::new()));
        let sink = ShaderParameterBinding::bind(&globals, "_Glow");
        let mut binding = TargetBinding::<f32>::from_value_sink(Box::new(sink));
        assert_eq!(binding.capture_default(), None);
        binding.apply(0.5);
        // The target is readable now, but it holds our own write.
        assert_eq!(binding.capture_default(), None);
        assert_eq!(binding.default_value(), None);
        assert!(!binding.release());
        assert_eq!(globals.borrow().get_by_name("_Glow"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn dynamic_sink_rejects_other_kinds_on_read() {
        let globals = Rc::new(RefCell::new(ShaderGlobals::new()));
        let id = globals.borrow_mut().property_to_id("_Tint");
        globals.borrow_mut().set(id, Value::Vec2([1.0, 2.0]));
        let bind = || Box::new(ShaderParameterBinding::bind(&globals, "_Tint"));
        assert_eq!(DynamicSink::<f32>::new(bind()).read(), None);
        assert_eq!(DynamicSink::<[f32; 2]>::new(bind()).read(), Some([1.0, 2.0]));
    }

    #[test]
    fn component_binding_checks_property_and_liveness() {
        let panel = Rc::new(RefCell::new(Panel {
            alive: true,
            alpha: 1.0,
        }));
        assert!(matches!(
            ComponentPropertyBinding::bind(&panel, "beta"),
            Err(MotionError::UnknownProperty { .. })
        ));
        let sink = ComponentPropertyBinding::bind(&panel, "alpha").unwrap();
        let mut binding = TargetBinding::<f32>::from_value_sink(Box::new(sink));
        assert_eq!(binding.capture_default(), Some(1.0));
        binding.apply(0.25);
        assert_eq!(panel.borrow().alpha, 0.25);
        panel.borrow_mut().alive = false;
        assert_eq!(binding.apply(0.5), WriteStatus::TargetLost { first: true });
        assert_eq!(panel.borrow().alpha, 0.25);
    }
}
