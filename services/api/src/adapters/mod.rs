pub mod content_llm;
pub mod outline_llm;
pub mod quiz_llm;
pub mod store;
pub mod structured;
pub mod task_llm;
pub mod tutor_llm;

pub use content_llm::ContentAdapter;
pub use outline_llm::OutlineAdapter;
pub use quiz_llm::QuizAdapter;
pub use store::SqliteCourseStore;
pub use task_llm::TaskAdapter;
pub use tutor_llm::TutorAdapter;
