pub mod remote;
pub mod traits;

pub use remote::DerivClient;
pub use traits::CandleSource;
