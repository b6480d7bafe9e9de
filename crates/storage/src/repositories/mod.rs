pub mod alerts_repo;
pub mod prefs_repo;
pub mod trades_repo;

pub use alerts_repo::AlertsRepository;
pub use prefs_repo::PrefsRepository;
pub use trades_repo::TradesRepository;
