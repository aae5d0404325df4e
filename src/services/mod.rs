pub mod aggregation;
pub mod auth_service;
pub mod dashboard_service;
pub mod entry_service;
pub mod export_service;
pub mod integration_service;
pub mod task_service;
