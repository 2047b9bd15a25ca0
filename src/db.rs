pub mod user_repo;
pub use user_repo::UserRepository;
pub mod property_repo;
pub use property_repo::PropertyRepository;
pub mod broker_repo;
pub use broker_repo::BrokerRepository;
pub mod prospect_repo;
pub use prospect_repo::ProspectRepository;
pub mod operations_repo;
pub use operations_repo::OperationsRepository;
pub mod payout_repo;
pub use payout_repo::PayoutRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
