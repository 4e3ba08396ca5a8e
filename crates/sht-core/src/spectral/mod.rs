pub mod index;

pub use index::{SpectralIndex, nlm_calc};
