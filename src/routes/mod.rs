pub mod dashboard;
pub mod dev;
pub mod entries;
pub mod exports;
pub mod integrations;
pub mod reflections;
pub mod tasks;
pub mod user_auth;
