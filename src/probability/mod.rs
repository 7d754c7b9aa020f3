pub mod compound;
pub mod distribution;
pub mod primitives;

pub use compound::compound_distribution;
pub use distribution::{trim_tail, Outcome, OutcomeDistribution};
pub use primitives::{convolve, die_success_probability, point_mass, shift, sum_of_n_dice};
