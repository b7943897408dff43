// Concrete implementations of the domain ports: filesystem storage and the
// secondary classifiers.

pub mod classifier;
pub mod storage;

pub use classifier::{HttpClassifier, JsonFileClassifier};
pub use storage::LocalStorage;
