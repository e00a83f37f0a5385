#![forbid(unsafe_code)]

pub mod app_services;
pub mod completion_service;
pub mod error;
pub mod progress_service;
pub mod tracker;
pub mod try_it;
pub mod tutorial;

pub use tutor_core::Clock;

pub use app_services::AppServices;
pub use completion_service::{CompletionClient, CompletionConfig, HttpCompletionClient};
pub use error::{AppServicesError, CompletionError, TutorialError};
pub use progress_service::{ModuleOverview, ModuleStatus, ProgressService};
pub use tracker::{ProgressTracker, RecordingTracker};
pub use try_it::TryItService;
pub use tutorial::TutorialRunner;
