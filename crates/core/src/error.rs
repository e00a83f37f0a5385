use thiserror::Error;

use crate::model::{ModuleError, ParseIdError, QuizError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
