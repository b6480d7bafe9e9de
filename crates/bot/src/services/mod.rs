pub mod dispatcher_service;
pub mod monitor_service;
