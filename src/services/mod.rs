pub mod refresh_service;
pub mod alert_service;

pub use refresh_service::{ RefreshPhase, RefreshService, RefreshSummary };
pub use alert_service::{ AlertService, CreateAlertRequest };
