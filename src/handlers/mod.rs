pub mod http;
pub mod models;
pub mod udp;

pub use http::AppState;
pub use models::{CityInfo, SessionInfo, WeaponInfo};
