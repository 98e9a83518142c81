pub mod bicycle;
pub mod config;
pub mod error;
pub mod tire;

pub use bicycle::{state_derivative, DynamicBicycleModel, VehicleParameters};
pub use config::ModelConfig;
pub use error::ModelError;
pub use tire::{compute_tire_forces, try_compute_tire_forces, PacejkaTireModel, TireParameters};
