pub mod errors;

pub use errors::{ShtError, ShtErrorKind, ShtResult};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How per-order work inside a single transform call is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionMode {
    #[default]
    Serial,
    /// Orders and latitude rows are distributed over the rayon thread pool.
    Parallel,
}

impl ExecutionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
        }
    }

    pub const fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel)
    }

    /// Evaluates `task(0..count)` in index order, on the rayon pool when
    /// parallel.
    pub fn map<T, F>(self, count: usize, task: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            Self::Serial => (0..count).map(task).collect(),
            Self::Parallel => (0..count).into_par_iter().map(task).collect(),
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
