use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Constructed,
    Duplicated,
    Destroyed,
}

impl EventKind {
    fn label(self) -> &'static str {
        match self {
            EventKind::Constructed => "construct",
            EventKind::Duplicated => "duplicate",
            EventKind::Destroyed => "destroy",
        }
    }
}

/// One lifecycle event of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub value: i32,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => value: {}", self.kind.label(), self.value)
    }
}

#[derive(Default)]
struct TraceLog {
    events: Vec<Event>,
    echo: Option<Box<dyn Write>>,
}

impl TraceLog {
    // Called from Element::drop; a failed write must not panic.
    fn echo(&mut self, line: impl fmt::Display) {
        if let Some(out) = self.echo.as_mut() {
            let _ = writeln!(out, "{}", line);
        }
    }
}

/// Shared sink that elements report their lifecycle to.
///
/// Cloning a `Trace` yields another handle to the same log. Events are kept
/// in the order they happen; an echoing trace also writes each one out as it
/// is recorded. Write errors are ignored.
#[derive(Clone, Default)]
pub struct Trace {
    log: Rc<RefCell<TraceLog>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trace that echoes to stdout.
    pub fn echoing() -> Self {
        Self::echoing_to(io::stdout())
    }

    pub fn echoing_to(out: impl Write + 'static) -> Self {
        let trace = Self::new();
        trace.log.borrow_mut().echo = Some(Box::new(out));
        trace
    }

    pub fn record(&self, kind: EventKind, value: i32) {
        let event = Event { kind, value };
        let mut log = self.log.borrow_mut();
        log.echo(event);
        log.events.push(event);
    }

    /// Writes a line of commentary when echoing. Notes are not events.
    pub fn note(&self, line: impl fmt::Display) {
        self.log.borrow_mut().echo(line);
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().events.clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.log.borrow().events.iter().filter(|e| e.kind == kind).count()
    }

    /// Values of all events of `kind`, in the order they were recorded.
    pub fn values(&self, kind: EventKind) -> Vec<i32> {
        self.log
            .borrow()
            .events
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.value)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().events.is_empty()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().events.clear();
    }
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let log = self.log.borrow();
        f.debug_struct("Trace")
            .field("events", &log.events)
            .field("echo", &log.echo.is_some())
            .finish()
    }
}
