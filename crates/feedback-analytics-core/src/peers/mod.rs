pub mod comparison;

pub use comparison::{
    compare_to_peers, compare_with_population, PeerComparison, PeerInput, QuartileBand,
};
