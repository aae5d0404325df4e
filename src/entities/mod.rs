pub mod entry;
pub mod evaluation;
pub mod guild_entity;
pub mod monthly_value_score_entity;
pub mod quarterly_reflection_entity;
pub mod task;
pub mod user_auth;
