use crate::scenario::{Growth, Options, Strategy};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "emplace_trace")]
#[command(version, about = "Trace element lifecycles for copy-append versus in-place append", long_about = None)]
pub struct Cli {
    /// Which insertion path to demonstrate
    #[arg(short, long, value_enum, default_value_t = Mode::Both)]
    pub strategy: Mode,

    /// Values to append, in order
    #[arg(long, value_name = "INT", value_delimiter = ',', allow_negative_numbers = true, default_values_t = [1, 11, 21])]
    pub values: Vec<i32>,

    /// How existing elements move when the sequence grows
    #[arg(short, long, value_enum, default_value_t = Growth::Relocate)]
    pub growth: Growth,

    /// Slots to reserve before the first append
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub reserve: usize,

    /// Set verbose level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    Copy,
    InPlace,
    Both,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn strategies(&self) -> Vec<Strategy> {
        match self.strategy {
            Mode::Copy => vec![Strategy::Copy],
            Mode::InPlace => vec![Strategy::InPlace],
            Mode::Both => vec![Strategy::Copy, Strategy::InPlace],
        }
    }

    pub fn options(&self) -> Options {
        Options {
            growth: self.growth,
            reserve: self.reserve,
            verbose: self.verbose,
        }
    }
}
