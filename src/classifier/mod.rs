pub mod mock;

pub use mock::{ClassifyError, Label, MockClassifier, Prediction, DEFAULT_DELAY};
