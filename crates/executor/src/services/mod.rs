pub mod notification_service;
pub mod scanner_service;
