mod home;
mod module;
mod overlay;
mod quiz;
mod state;
mod visualizations;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use home::HomeView;
pub use module::ModuleView;
pub use state::{ViewError, ViewState, view_state_from_resource};
