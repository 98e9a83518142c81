//! JSON configuration for overriding the default vehicle and tire constants.
//!
//! Any field left out keeps its default, and the short symbol names used in
//! the literature (`Iz`, `lf`, `Df`, `Cr2`, ...) are accepted as aliases.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bicycle::{DynamicBicycleModel, VehicleParameters};
use crate::error::ModelError;
use crate::tire::TireParameters;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub vehicle: VehicleParameters,
    pub tire: TireParameters,
}

impl ModelConfig {
    /// Parse and validate a configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!("Loaded model configuration: {:?}", config);
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.vehicle.validate()?;
        self.tire.validate()
    }

    pub fn into_model(self) -> DynamicBicycleModel {
        DynamicBicycleModel::new(self.vehicle, self.tire)
    }
}
