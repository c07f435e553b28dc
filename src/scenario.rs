use crate::element::Element;
use crate::trace::{Event, EventKind, Trace};
use raii_seq::{GrowthPolicy, Insertion, Sequence, TryReserveError};
use std::fmt;

/// How each value enters the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Build a temporary, then duplicate it into the sequence
    Copy,
    /// Build the element directly inside the sequence
    InPlace,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Copy => write!(f, "append by copy"),
            Strategy::InPlace => write!(f, "append in place"),
        }
    }
}

/// How existing elements move when the sequence outgrows its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Growth {
    /// Move elements without any lifecycle event
    #[default]
    Relocate,
    /// Duplicate every element into the new storage, then destroy the old ones
    Duplicate,
}

impl From<Growth> for GrowthPolicy {
    fn from(growth: Growth) -> Self {
        match growth {
            Growth::Relocate => GrowthPolicy::Relocate,
            Growth::Duplicate => GrowthPolicy::Duplicate,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub growth: Growth,
    /// Slots reserved before the first append.
    pub reserve: usize,
    pub verbose: u8,
}

/// What one run left behind once its sequence was torn down.
#[derive(Debug, Clone)]
pub struct Report {
    pub strategy: Strategy,
    pub len: usize,
    pub capacity: usize,
    /// Values read back from the sequence just before teardown.
    pub stored: Vec<i32>,
    pub events: Vec<Event>,
}

impl Report {
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Every instance ever created was destroyed exactly once.
    pub fn is_balanced(&self) -> bool {
        self.count(EventKind::Destroyed)
            == self.count(EventKind::Constructed) + self.count(EventKind::Duplicated)
    }

    pub fn summary(&self) -> String {
        format!(
            "constructed: {}, duplicated: {}, destroyed: {}",
            self.count(EventKind::Constructed),
            self.count(EventKind::Duplicated),
            self.count(EventKind::Destroyed),
        )
    }
}

/// Appends `values` to a fresh sequence with `strategy`, then drops it.
///
/// Events recorded on `trace` before the call are left alone; the report
/// only holds the events of this run.
pub fn run(
    strategy: Strategy,
    values: &[i32],
    options: &Options,
    trace: &Trace,
) -> Result<Report, TryReserveError> {
    let first_event = trace.len();

    let (len, capacity, stored) = {
        let mut seq = new_sequence(options.growth);
        seq.try_reserve(options.reserve)?;
        trace.note(format_args!("length: {}", seq.len()));
        trace.note("");

        for &value in values {
            append(&mut seq, strategy, value, trace);
            if options.verbose > 0 {
                trace.note(format_args!("len: {}, capacity: {}", seq.len(), seq.capacity()));
            }
            trace.note("");
        }

        let stored = seq.iter().map(Element::value).collect::<Vec<_>>();
        (seq.len(), seq.capacity(), stored)
        // seq is torn down here, index 0 first
    };

    let events = trace.events().split_off(first_event);
    Ok(Report {
        strategy,
        len,
        capacity,
        stored,
        events,
    })
}

fn new_sequence(growth: Growth) -> Sequence<Element> {
    match GrowthPolicy::from(growth) {
        GrowthPolicy::Relocate => Sequence::new(),
        GrowthPolicy::Duplicate => Sequence::new().duplicate_on_growth(),
    }
}

fn append(seq: &mut Sequence<Element>, strategy: Strategy, value: i32, trace: &Trace) {
    match strategy {
        // the temporary lives until the end of this statement
        Strategy::Copy => seq.insert::<(i32, &Trace)>(Insertion::ByValue(&Element::new(value, trace))),
        Strategy::InPlace => seq.insert(Insertion::ByConstruction((value, trace))),
    }
}
