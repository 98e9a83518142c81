//! Dynamic bicycle model referenced to the center of gravity.
//!
//! Longitudinal drivetrain forces act at the CoG; lateral tire forces act at
//! the axles, with the front axle force rotated by the steer angle.

use log::trace;
use serde::{Deserialize, Serialize};
use simcore::{
    ControlInput, DynamicsModel, StateDerivative, TireForces, TireModel, VehicleState,
};

use crate::error::{ensure, ModelError};
use crate::tire::{check_state, compute_tire_forces, TireParameters};

/// Rigid body properties of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParameters {
    /// Total vehicle mass in kg.
    pub mass: f64,
    /// Moment of inertia about the vertical axis (yaw) in kg*m^2.
    #[serde(alias = "Iz")]
    pub moment_of_inertia: f64,
    /// Distance from the center of gravity to the front axle in meters.
    #[serde(alias = "lf")]
    pub front_axle_distance: f64,
    /// Distance from the center of gravity to the rear axle in meters.
    #[serde(alias = "lr")]
    pub rear_axle_distance: f64,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        VehicleParameters {
            mass: 1212.6160,
            moment_of_inertia: 1560.3729,
            front_axle_distance: 0.88392,
            rear_axle_distance: 1.50876,
        }
    }
}

impl VehicleParameters {
    pub fn wheelbase(&self) -> f64 {
        self.front_axle_distance + self.rear_axle_distance
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        ensure(self.mass > 0.0 && self.mass.is_finite(), "mass", self.mass, "must be positive")?;
        ensure(
            self.moment_of_inertia > 0.0 && self.moment_of_inertia.is_finite(),
            "moment_of_inertia",
            self.moment_of_inertia,
            "must be positive",
        )?;
        ensure(
            self.front_axle_distance >= 0.0 && self.front_axle_distance.is_finite(),
            "front_axle_distance",
            self.front_axle_distance,
            "must be non-negative",
        )?;
        ensure(
            self.rear_axle_distance >= 0.0 && self.rear_axle_distance.is_finite(),
            "rear_axle_distance",
            self.rear_axle_distance,
            "must be non-negative",
        )
    }
}

/// Rotate a front-axle force pair from the wheel frame into the body frame.
fn transform_forces_to_body(
    longitudinal_force: f64,
    lateral_force: f64,
    steer_angle: f64,
) -> (f64, f64) {
    let cos_a = steer_angle.cos();
    let sin_a = steer_angle.sin();

    let fx = longitudinal_force * cos_a - lateral_force * sin_a;
    let fy = longitudinal_force * sin_a + lateral_force * cos_a;

    (fx, fy)
}

/// `dx/dt = f(x, u)` given precomputed tire forces.
///
/// Only `control.steer_speed` is read. No input or output saturation.
pub fn state_derivative(
    state: &VehicleState,
    control: &ControlInput,
    forces: &TireForces,
    vehicle: &VehicleParameters,
) -> StateDerivative {
    let (sin_yaw, cos_yaw) = state.yaw.sin_cos();

    let (front_fx, front_fy) = transform_forces_to_body(
        forces.front_longitudinal,
        forces.front_lateral,
        state.steer_angle,
    );

    // Ffx does not enter the yaw moment: drive forces act at the CoG.
    let yaw_moment = forces.front_lateral * vehicle.front_axle_distance * state.steer_angle.cos()
        - forces.rear_lateral * vehicle.rear_axle_distance;

    let derivative = StateDerivative {
        dx: state.vx * cos_yaw - state.vy * sin_yaw,
        dy: state.vx * sin_yaw + state.vy * cos_yaw,
        dyaw: state.yaw_rate,
        dvx: 1.0 / vehicle.mass
            * (forces.rear_longitudinal + front_fx + state.vy * state.yaw_rate * vehicle.mass),
        dvy: 1.0 / vehicle.mass
            * (forces.rear_lateral + front_fy - state.vx * state.yaw_rate * vehicle.mass),
        dyaw_rate: 1.0 / vehicle.moment_of_inertia * yaw_moment,
        dsteer_angle: control.steer_speed,
    };
    trace!("state derivative {:?}", derivative);
    derivative
}

/// Tire model and rigid body dynamics evaluated together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicBicycleModel {
    pub vehicle: VehicleParameters,
    pub tire: TireParameters,
}

impl DynamicBicycleModel {
    pub fn new(vehicle: VehicleParameters, tire: TireParameters) -> Self {
        DynamicBicycleModel { vehicle, tire }
    }

    /// Tire forces and the resulting state derivative.
    pub fn evaluate(
        &self,
        state: &VehicleState,
        control: &ControlInput,
    ) -> (TireForces, StateDerivative) {
        let forces = compute_tire_forces(state, control, &self.vehicle, &self.tire);
        let derivative = state_derivative(state, control, &forces, &self.vehicle);
        (forces, derivative)
    }

    /// Checked variant of [`DynamicsModel::derivative`]; rejects standstill
    /// and non-finite states instead of returning NaN.
    pub fn try_derivative(
        &self,
        state: &VehicleState,
        control: &ControlInput,
    ) -> Result<StateDerivative, ModelError> {
        check_state(state)?;
        Ok(self.derivative(state, control))
    }
}

impl TireModel for DynamicBicycleModel {
    fn tire_forces(&self, state: &VehicleState, control: &ControlInput) -> TireForces {
        compute_tire_forces(state, control, &self.vehicle, &self.tire)
    }
}

impl DynamicsModel for DynamicBicycleModel {
    fn derivative(&self, state: &VehicleState, control: &ControlInput) -> StateDerivative {
        self.evaluate(state, control).1
    }
}
