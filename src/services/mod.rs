pub mod food_classifier;
