#![forbid(unsafe_code)]

//! Synchronous, single-threaded signals.
//!
//! A [`Signal<T>`] is a named sink whose argument tuple type is fixed by `T`.
//! Emission calls every receiver connected *at the moment `emit` starts*, in
//! connection order, on the calling thread:
//!
//! - receivers connected during an emission are first called on the next one;
//! - receivers disconnected during an emission are still called by it;
//! - re-entrant emission of the same signal is allowed;
//! - the first receiver error stops the emission and is returned to the caller.
//!
//! [`SignalBus`] is a name-keyed registry for code that wires signals by
//! string (designer tooling, scripted connections).

use std::any::Any;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::SlotError;

/// Return type of a receiver.
pub type SlotResult = Result<(), SlotError>;

type Slot<T> = Rc<dyn Fn(&T) -> SlotResult>;

/// Handle identifying one connection on one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

struct Inner<T> {
    name: Cow<'static, str>,
    next_id: Cell<u64>,
    blocked: Cell<bool>,
    slots: RefCell<Vec<(ConnectionId, Slot<T>)>>,
}

/// A typed signal. Cloning yields another handle to the same signal.
pub struct Signal<T: 'static> {
    inner: Rc<Inner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.inner.name)
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new("anonymous")
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: name.into(),
                next_id: Cell::new(0),
                blocked: Cell::new(false),
                slots: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Connect a fallible receiver.
    pub fn connect<F>(&self, receiver: F) -> ConnectionId
    where
        F: Fn(&T) -> SlotResult + 'static,
    {
        let id = ConnectionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .slots
            .borrow_mut()
            .push((id, Rc::new(receiver) as Slot<T>));
        id
    }

    /// Connect a receiver that cannot fail.
    pub fn connect_ok<F>(&self, receiver: F) -> ConnectionId
    where
        F: Fn(&T) + 'static,
    {
        self.connect(move |args| {
            receiver(args);
            Ok(())
        })
    }

    /// Remove a connection. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut slots = self.inner.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|(cid, _)| *cid != id);
        slots.len() != before
    }

    pub fn disconnect_all(&self) {
        self.inner.slots.borrow_mut().clear();
    }

    pub fn receiver_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.inner.slots.borrow().iter().any(|(cid, _)| *cid == id)
    }

    /// While blocked, `emit` is a no-op.
    pub fn set_blocked(&self, blocked: bool) {
        self.inner.blocked.set(blocked);
    }

    pub fn is_blocked(&self) -> bool {
        self.inner.blocked.get()
    }

    /// Invoke the receivers connected when the call starts, in order.
    pub fn emit(&self, args: &T) -> SlotResult {
        if self.inner.blocked.get() {
            return Ok(());
        }
        let snapshot: Vec<Slot<T>> = self
            .inner
            .slots
            .borrow()
            .iter()
            .map(|(_, slot)| Rc::clone(slot))
            .collect();
        for slot in snapshot {
            slot(args)?;
        }
        Ok(())
    }

    /// Re-emit every emission of `self` on `target`.
    ///
    /// The forwarding receiver holds `target` weakly, so dropping the last
    /// handle to `target` turns the forward into a no-op.
    pub fn forward_to(&self, target: &Signal<T>) -> ConnectionId {
        let weak: Weak<Inner<T>> = Rc::downgrade(&target.inner);
        self.connect(move |args| match weak.upgrade() {
            Some(inner) => Signal { inner }.emit(args),
            None => Ok(()),
        })
    }
}

/// Name-keyed registry of signals with erased argument types.
#[derive(Default)]
pub struct SignalBus {
    signals: HashMap<String, Box<dyn Any>>,
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.signals.keys().collect();
        names.sort();
        f.debug_struct("SignalBus").field("signals", &names).finish()
    }
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing signal under `name`, replacing any previous entry.
    pub fn register<T: 'static>(&mut self, name: impl Into<String>, signal: Signal<T>) {
        self.signals.insert(name.into(), Box::new(signal));
    }

    /// Fetch (creating on first use) the signal named `name` with argument
    /// type `T`. Returns `None` if the name is bound to a different type.
    pub fn signal<T: 'static>(&mut self, name: &str) -> Option<Signal<T>> {
        let entry = self
            .signals
            .entry(name.to_owned())
            .or_insert_with(|| Box::new(Signal::<T>::new(name.to_owned())));
        entry.downcast_ref::<Signal<T>>().cloned()
    }

    /// Look up without creating.
    pub fn get<T: 'static>(&self, name: &str) -> Option<Signal<T>> {
        self.signals
            .get(name)
            .and_then(|s| s.downcast_ref::<Signal<T>>())
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    pub fn connect<T, F>(&mut self, name: &str, receiver: F) -> Result<ConnectionId, SlotError>
    where
        T: 'static,
        F: Fn(&T) -> SlotResult + 'static,
    {
        self.signal::<T>(name)
            .map(|s| s.connect(receiver))
            .ok_or_else(|| type_mismatch(name))
    }

    /// Emit by name. An unknown name has no receivers and succeeds.
    pub fn emit<T: 'static>(&self, name: &str, args: &T) -> SlotResult {
        match self.signals.get(name) {
            None => Ok(()),
            Some(entry) => match entry.downcast_ref::<Signal<T>>() {
                Some(signal) => signal.emit(args),
                None => Err(type_mismatch(name)),
            },
        }
    }
}

fn type_mismatch(name: &str) -> SlotError {
    SlotError::new(format!("signal `{name}` has a different argument type"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&i32)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let make = move |tag: &str| {
            let l = Rc::clone(&l);
            let tag = tag.to_owned();
            Box::new(move |v: &i32| l.borrow_mut().push(format!("{tag}:{v}"))) as Box<dyn Fn(&i32)>
        };
        (log, make)
    }

    // ── Ordering ──

    #[test]
    fn receivers_run_in_connection_order() {
        let sig = Signal::<i32>::new("value");
        let (log, make) = recorder();
        for tag in ["r1", "r2", "r3"] {
            let f = make(tag);
            sig.connect_ok(move |v| f(v));
        }
        sig.emit(&7).expect("emit");
        assert_eq!(*log.borrow(), ["r1:7", "r2:7", "r3:7"]);
    }

    #[test]
    fn connect_during_emit_waits_for_next_emission() {
        let sig = Signal::<i32>::new("late");
        let hits = Rc::new(Cell::new(0));
        let sig2 = sig.clone();
        let h = Rc::clone(&hits);
        sig.connect_ok(move |_| {
            let h = Rc::clone(&h);
            sig2.connect_ok(move |_| h.set(h.get() + 1));
        });
        sig.emit(&1).expect("first");
        assert_eq!(hits.get(), 0);
        sig.emit(&2).expect("second");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn disconnect_during_emit_affects_next_emission() {
        let sig = Signal::<i32>::new("drop");
        let hits = Rc::new(Cell::new(0));
        let victim = Rc::new(Cell::new(None::<ConnectionId>));
        let s = sig.clone();
        let v = Rc::clone(&victim);
        sig.connect_ok(move |_| {
            if let Some(id) = v.get() {
                s.disconnect(id);
            }
        });
        let h = Rc::clone(&hits);
        victim.set(Some(sig.connect_ok(move |_| h.set(h.get() + 1))));
        sig.emit(&0).expect("emit");
        assert_eq!(hits.get(), 1, "still called in the current emission");
        sig.emit(&0).expect("emit");
        assert_eq!(hits.get(), 1);
        assert_eq!(sig.receiver_count(), 1);
    }

    #[test]
    fn reentrant_emit_is_allowed() {
        let sig = Signal::<u32>::new("countdown");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = sig.clone();
        let log = Rc::clone(&seen);
        sig.connect(move |n| {
            log.borrow_mut().push(*n);
            if *n > 0 { s.emit(&(n - 1)) } else { Ok(()) }
        });
        sig.emit(&3).expect("emit");
        assert_eq!(*seen.borrow(), [3, 2, 1, 0]);
    }

    // ── Errors ──

    #[test]
    fn first_error_stops_emission_and_propagates() {
        let sig = Signal::<()>::new("fails");
        let after = Rc::new(Cell::new(false));
        sig.connect(|_| Err(SlotError::new("nope")));
        let a = Rc::clone(&after);
        sig.connect_ok(move |_| a.set(true));
        let err = sig.emit(&()).expect_err("should fail");
        assert_eq!(err.message(), "nope");
        assert!(!after.get());
    }

    #[test]
    fn blocked_signal_is_silent() {
        let sig = Signal::<()>::new("quiet");
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        sig.connect_ok(move |_| h.set(true));
        sig.set_blocked(true);
        sig.emit(&()).expect("emit");
        assert!(!hit.get());
    }

    #[test]
    fn forward_chains_signals() {
        let a = Signal::<(u16, u16)>::new("a");
        let b = Signal::<(u16, u16)>::new("b");
        let got = Rc::new(Cell::new((0, 0)));
        let g = Rc::clone(&got);
        b.connect_ok(move |v| g.set(*v));
        a.forward_to(&b);
        a.emit(&(4, 2)).expect("emit");
        assert_eq!(got.get(), (4, 2));
        drop(b);
        a.emit(&(1, 1)).expect("dangling forward is a no-op");
    }

    // ── Bus ──

    #[test]
    fn bus_routes_by_name_and_checks_types() {
        let mut bus = SignalBus::new();
        let got = Rc::new(Cell::new(false));
        let g = Rc::clone(&got);
        bus.connect::<bool, _>("focusChanged", move |v| {
            g.set(*v);
            Ok(())
        })
        .expect("connect");
        bus.emit("focusChanged", &true).expect("emit");
        assert!(got.get());
        assert!(bus.emit("focusChanged", &1u8).is_err());
        assert!(bus.signal::<u8>("focusChanged").is_none());
        assert!(bus.emit("nobody", &()).is_ok());
        assert!(bus.get::<bool>("focusChanged").is_some());
    }

    proptest! {
        #[test]
        fn every_receiver_sees_every_value_in_order(values in proptest::collection::vec(any::<i32>(), 0..20)) {
            let sig = Signal::<i32>::new("p");
            let (log, make) = recorder();
            for tag in ["r1", "r2", "r3"] {
                let f = make(tag);
                sig.connect_ok(move |v| f(v));
            }
            for v in &values {
                sig.emit(v).expect("emit");
            }
            let expected: Vec<String> = values
                .iter()
                .flat_map(|v| ["r1", "r2", "r3"].map(|t| format!("{t}:{v}")))
                .collect();
            prop_assert_eq!(log.borrow().clone(), expected);
        }
    }
}
