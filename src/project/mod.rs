//! Project file parsing

mod project_file;

pub use project_file::{parse_project, QueryProject, PROJECT_FILE_NAME};
