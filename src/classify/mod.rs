pub mod classifier;

pub use classifier::{accuracy, argmax, confidence, predict_label, Classifier, Prediction};
