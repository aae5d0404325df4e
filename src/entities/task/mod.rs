pub mod task_application_entity;
pub mod task_entity;
