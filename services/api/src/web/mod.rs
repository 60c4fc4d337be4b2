pub mod assessment_task;
pub mod chat_task;
pub mod content_task;
pub mod course_task;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod state;
pub mod ws_handler;


// Re-export the handlers the binary mounts on the router.
pub use rest::{get_course_handler, list_courses_handler};
pub use ws_handler::ws_handler;
