use crate::trace::{EventKind, Trace};
use raii_seq::Construct;
use std::fmt;

/// A value holder that reports its construction, duplication and
/// destruction to a [`Trace`].
pub struct Element {
    value: i32,
    trace: Trace,
}

impl Element {
    pub fn new(value: i32, trace: &Trace) -> Self {
        trace.record(EventKind::Constructed, value);
        Element {
            value,
            trace: trace.clone(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for Element {
    fn clone(&self) -> Self {
        self.trace.record(EventKind::Duplicated, self.value);
        Element {
            value: self.value,
            trace: self.trace.clone(),
        }
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        self.trace.record(EventKind::Destroyed, self.value);
    }
}

impl<'a> Construct<(i32, &'a Trace)> for Element {
    fn construct((value, trace): (i32, &'a Trace)) -> Self {
        Element::new(value, trace)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element").field("value", &self.value).finish()
    }
}
