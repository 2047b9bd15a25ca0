pub mod auth;
pub mod broker_clients;
pub mod invitations;
pub mod notifications;
pub mod operations;
pub mod owner;
pub mod payouts;
pub mod properties;
pub mod prospects;
pub mod realtime;
