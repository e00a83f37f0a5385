mod markdown_vm;
mod module_vm;

pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use module_vm::{StatusBadgeVm, TutorialAction, apply_action, status_badge, status_cta};
