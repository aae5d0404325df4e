pub mod login_code_entity;
pub mod profile_entity;
