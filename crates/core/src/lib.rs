#![forbid(unsafe_code)]

pub mod catalog;
pub mod controller;
pub mod error;
pub mod model;
pub mod overlay;
pub mod sequencer;
pub mod settings;
pub mod time;
pub mod visualization;

pub use controller::{Effect, FadeToken, Screen, StepState, StepperItem, TutorialController};
pub use error::Error;
pub use settings::TutorialSettings;
pub use time::Clock;
