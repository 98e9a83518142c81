use nalgebra as na;
use serde::{Deserialize, Serialize};

pub const STATE_DIM: usize = 7;
pub const CONTROL_DIM: usize = 2;
pub const TIRE_FORCE_DIM: usize = 4;

pub type StateVector = na::SVector<f64, STATE_DIM>;
pub type ControlVector = na::SVector<f64, CONTROL_DIM>;
pub type TireForceVector = na::SVector<f64, TIRE_FORCE_DIM>;

// Vehicle State
/// Planar motion state of the vehicle, referenced to the center of gravity.
///
/// Vector ordering is `[x, y, yaw, vx, vy, yaw_rate, steer_angle]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Global x position (m)
    pub x: f64,
    /// Global y position (m)
    pub y: f64,
    /// Heading in the global frame (rad)
    pub yaw: f64,
    /// Body-frame longitudinal velocity (m/s)
    pub vx: f64,
    /// Body-frame lateral velocity (m/s)
    pub vy: f64,
    /// Rotational speed about the vertical axis (rad/s)
    pub yaw_rate: f64,
    /// Front wheel steer angle (rad)
    pub steer_angle: f64,
}

impl VehicleState {
    pub fn to_vector(&self) -> StateVector {
        StateVector::from_column_slice(&[
            self.x,
            self.y,
            self.yaw,
            self.vx,
            self.vy,
            self.yaw_rate,
            self.steer_angle,
        ])
    }

    pub fn from_vector(v: &StateVector) -> Self {
        VehicleState {
            x: v[0],
            y: v[1],
            yaw: v[2],
            vx: v[3],
            vy: v[4],
            yaw_rate: v[5],
            steer_angle: v[6],
        }
    }

    /// Returns the name of the first non-finite field, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("x", self.x),
            ("y", self.y),
            ("yaw", self.yaw),
            ("vx", self.vx),
            ("vy", self.vy),
            ("yaw_rate", self.yaw_rate),
            ("steer_angle", self.steer_angle),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}

/// Time derivative of a [`VehicleState`], same ordering and units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDerivative {
    pub dx: f64,
    pub dy: f64,
    pub dyaw: f64,
    pub dvx: f64,
    pub dvy: f64,
    pub dyaw_rate: f64,
    pub dsteer_angle: f64,
}

impl StateDerivative {
    pub fn to_vector(&self) -> StateVector {
        StateVector::from_column_slice(&[
            self.dx,
            self.dy,
            self.dyaw,
            self.dvx,
            self.dvy,
            self.dyaw_rate,
            self.dsteer_angle,
        ])
    }

    pub fn from_vector(v: &StateVector) -> Self {
        StateDerivative {
            dx: v[0],
            dy: v[1],
            dyaw: v[2],
            dvx: v[3],
            dvy: v[4],
            dyaw_rate: v[5],
            dsteer_angle: v[6],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

// Control
/// Driver/actuator command. No bounds are enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// Commanded drivetrain force (N, signed)
    pub drive_force: f64,
    /// Steer angle rate (rad/s)
    pub steer_speed: f64,
}

impl ControlInput {
    pub fn new(drive_force: f64, steer_speed: f64) -> Self {
        ControlInput { drive_force, steer_speed }
    }

    pub fn to_vector(&self) -> ControlVector {
        ControlVector::new(self.drive_force, self.steer_speed)
    }

    pub fn from_vector(v: &ControlVector) -> Self {
        ControlInput {
            drive_force: v[0],
            steer_speed: v[1],
        }
    }
}

// Tire
/// Front and rear slip angles (rad).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlipAngles {
    pub front: f64,
    pub rear: f64,
}

/// Per-axle tire forces, ordered `[Ffx, Frx, Ffy, Fry]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TireForces {
    /// Front longitudinal force (N)
    pub front_longitudinal: f64,
    /// Rear longitudinal force (N)
    pub rear_longitudinal: f64,
    /// Front lateral force (N)
    pub front_lateral: f64,
    /// Rear lateral force (N)
    pub rear_lateral: f64,
}

impl TireForces {
    pub fn to_vector(&self) -> TireForceVector {
        TireForceVector::new(
            self.front_longitudinal,
            self.rear_longitudinal,
            self.front_lateral,
            self.rear_lateral,
        )
    }

    pub fn from_vector(v: &TireForceVector) -> Self {
        TireForces {
            front_longitudinal: v[0],
            rear_longitudinal: v[1],
            front_lateral: v[2],
            rear_lateral: v[3],
        }
    }

    /// Net longitudinal force summed over both axles.
    pub fn total_longitudinal(&self) -> f64 {
        self.front_longitudinal + self.rear_longitudinal
    }
}

// Model Traits
/// Maps state and control to per-axle tire forces.
pub trait TireModel {
    fn tire_forces(&self, state: &VehicleState, control: &ControlInput) -> TireForces;
}

/// Continuous-time model `dx/dt = f(x, u)`.
///
/// Implementors are pure: no state is carried between calls, so a single
/// model can be shared across threads and integrator stages.
pub trait DynamicsModel {
    fn derivative(&self, state: &VehicleState, control: &ControlInput) -> StateDerivative;

    /// Vector form of [`DynamicsModel::derivative`] for external integrators.
    fn derivative_vector(&self, x: &StateVector, u: &ControlVector) -> StateVector {
        self.derivative(&VehicleState::from_vector(x), &ControlInput::from_vector(u))
            .to_vector()
    }
}
