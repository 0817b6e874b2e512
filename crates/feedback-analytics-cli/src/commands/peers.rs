use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use feedback_analytics_core::peers::{self, PeerInput};

use crate::input;

/// Arguments for placing an individual among their peers
#[derive(Args)]
pub struct PeersArgs {
    /// Path to JSON input file (individual_score + population)
    #[arg(long)]
    pub input: Option<String>,

    /// Individual's score (overrides the input file)
    #[arg(long)]
    pub score: Option<Decimal>,

    /// Population scores (comma-separated, e.g. "3,4,5,6,7")
    #[arg(long, value_delimiter = ',')]
    pub population: Option<Vec<Decimal>>,
}

pub fn run_peers(args: PeersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let peer_input: PeerInput = match (args.input.as_deref(), args.population) {
        (None, Some(population)) => PeerInput {
            individual_score: args
                .score
                .ok_or("--score is required with --population (or provide --input)")?,
            population,
        },
        (path, _) => {
            let mut from_file: PeerInput = input::read_input(path, "peer comparison")?;
            if let Some(score) = args.score {
                from_file.individual_score = score;
            }
            from_file
        }
    };

    let result = peers::compare_to_peers(&peer_input)?;
    Ok(serde_json::to_value(result)?)
}
