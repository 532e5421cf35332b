pub(crate) mod errors;
mod forms;
mod handlers;
mod views;

pub(crate) use forms::{AdminTagAttachForm, AdminTagCreateForm};
pub(crate) use handlers::*;
pub(crate) use views::build_tags_panel_view;
