use anyhow::{Context, Result};
use emplace_trace::cli::Cli;
use emplace_trace::{scenario, Trace};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let options = cli.options();
    let trace = Trace::echoing();

    for strategy in cli.strategies() {
        println!("--- {} ---", strategy);
        let report = scenario::run(strategy, &cli.values, &options, &trace)
            .with_context(|| format!("Failed to reserve {} slots for {}", options.reserve, strategy))?;

        if options.verbose > 0 {
            println!("{}", report.summary());
        }
        println!();
    }

    Ok(())
}
