pub mod isolation_forest;

pub use isolation_forest::{IsolationForest, IsolationTree};
