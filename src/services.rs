pub mod auth;
pub mod broker_service;
pub mod lead_scoring;
pub mod notification_service;
pub mod operations_service;
pub mod payout_service;
pub mod prospect_service;
