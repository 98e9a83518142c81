//! Simplified Pacejka tire model with a longitudinal drivetrain model
//! (AMZ Driverless: The Full Autonomous Racing System).
//!
//! - Lateral force per axle from the magic formula `D * sin(C * atan(B * alpha))`
//! - Longitudinal force `Cm * drive_force - Cr0 - Cr2 * vx^2`, split by `torque_split`
//!
//! Load transfer and combined slip are neglected. Nothing is saturated or
//! clamped, and `vx = 0` is not guarded: the unchecked functions return NaN
//! there. Use [`try_compute_tire_forces`] to reject such inputs instead.

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use simcore::{ControlInput, SlipAngles, TireForces, TireModel, VehicleState};

use crate::bicycle::VehicleParameters;
use crate::error::{ensure, ModelError};

/// Pacejka fitting constants and drivetrain/drag coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TireParameters {
    /// Front tire peak factor D (N)
    #[serde(alias = "Df")]
    pub front_peak: f64,
    /// Front tire shape factor C
    #[serde(alias = "Cf")]
    pub front_shape: f64,
    /// Front tire stiffness factor B
    #[serde(alias = "Bf")]
    pub front_stiffness: f64,
    /// Rear tire peak factor D (N)
    #[serde(alias = "Dr")]
    pub rear_peak: f64,
    /// Rear tire shape factor C
    #[serde(alias = "Cr")]
    pub rear_shape: f64,
    /// Rear tire stiffness factor B
    #[serde(alias = "Br")]
    pub rear_stiffness: f64,
    /// Motor constant Cm
    #[serde(alias = "Cm")]
    pub motor_constant: f64,
    /// Rolling resistance Cr0 (N)
    #[serde(alias = "Cr0")]
    pub rolling_resistance: f64,
    /// Drag coefficient Cr2. Negative in the fitted default; the sign is
    /// used as given, not re-derived from the direction of travel.
    #[serde(alias = "Cr2")]
    pub drag: f64,
    /// Fraction of net longitudinal force sent to the front axle, in [0, 1]
    pub torque_split: f64,
}

impl Default for TireParameters {
    fn default() -> Self {
        TireParameters {
            front_peak: 3714.8218,
            front_shape: 5.9139,
            front_stiffness: 9.4246,
            rear_peak: 3702.9280,
            rear_shape: 1.3754,
            rear_stiffness: 24.9504,
            motor_constant: 0.9459,
            rolling_resistance: 2.3451,
            drag: -0.0095,
            torque_split: 0.0, // rear-wheel drive
        }
    }
}

impl TireParameters {
    /// Set the front/rear drive split
    pub fn with_torque_split(mut self, torque_split: f64) -> Self {
        self.torque_split = torque_split;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let finite = [
            ("front_peak", self.front_peak),
            ("front_shape", self.front_shape),
            ("front_stiffness", self.front_stiffness),
            ("rear_peak", self.rear_peak),
            ("rear_shape", self.rear_shape),
            ("rear_stiffness", self.rear_stiffness),
            ("motor_constant", self.motor_constant),
            ("rolling_resistance", self.rolling_resistance),
            ("drag", self.drag),
        ];
        for (name, value) in finite {
            ensure(value.is_finite(), name, value, "must be finite")?;
        }
        ensure(
            (0.0..=1.0).contains(&self.torque_split),
            "torque_split",
            self.torque_split,
            "must lie in [0, 1]",
        )
    }
}

/// Front and rear slip angles.
///
/// `alpha_f = steer - atan((yaw_rate * lf + vy) / vx)`,
/// `alpha_r = atan((yaw_rate * lr - vy) / vx)`.
pub fn slip_angles(state: &VehicleState, vehicle: &VehicleParameters) -> SlipAngles {
    let front = state.steer_angle
        - ((state.yaw_rate * vehicle.front_axle_distance + state.vy) / state.vx).atan();
    let rear = ((state.yaw_rate * vehicle.rear_axle_distance - state.vy) / state.vx).atan();
    SlipAngles { front, rear }
}

/// Magic formula lateral force for a single axle.
pub fn pacejka_lateral_force(slip_angle: f64, peak: f64, shape: f64, stiffness: f64) -> f64 {
    peak * (shape * (stiffness * slip_angle).atan()).sin()
}

/// Net longitudinal force before the front/rear split.
pub fn longitudinal_force(drive_force: f64, vx: f64, tire: &TireParameters) -> f64 {
    tire.motor_constant * drive_force - tire.rolling_resistance - tire.drag * vx.powi(2)
}

/// Tire forces for the current state and control.
///
/// Only `control.drive_force` is read.
pub fn compute_tire_forces(
    state: &VehicleState,
    control: &ControlInput,
    vehicle: &VehicleParameters,
    tire: &TireParameters,
) -> TireForces {
    let slip = slip_angles(state, vehicle);

    let front_lateral =
        pacejka_lateral_force(slip.front, tire.front_peak, tire.front_shape, tire.front_stiffness);
    let rear_lateral =
        pacejka_lateral_force(slip.rear, tire.rear_peak, tire.rear_shape, tire.rear_stiffness);

    let fx = longitudinal_force(control.drive_force, state.vx, tire);

    let forces = TireForces {
        front_longitudinal: fx * tire.torque_split,
        rear_longitudinal: fx * (1.0 - tire.torque_split),
        front_lateral,
        rear_lateral,
    };
    trace!(
        "slip f={:.6} r={:.6} -> Ffx={:.3} Frx={:.3} Ffy={:.3} Fry={:.3}",
        slip.front,
        slip.rear,
        forces.front_longitudinal,
        forces.rear_longitudinal,
        forces.front_lateral,
        forces.rear_lateral
    );
    forces
}

/// Precondition check shared by the checked evaluation paths.
pub(crate) fn check_state(state: &VehicleState) -> Result<(), ModelError> {
    if let Some(field) = state.first_non_finite() {
        warn!("Rejecting state with non-finite field {}", field);
        return Err(ModelError::NonFiniteState { field });
    }
    if state.vx == 0.0 {
        warn!("Rejecting state at standstill, slip angles are singular");
        return Err(ModelError::StandstillSingularity { vx: state.vx });
    }
    Ok(())
}

/// Same as [`compute_tire_forces`], but fails instead of returning non-finite
/// forces when `vx` is zero or the state is not finite.
pub fn try_compute_tire_forces(
    state: &VehicleState,
    control: &ControlInput,
    vehicle: &VehicleParameters,
    tire: &TireParameters,
) -> Result<TireForces, ModelError> {
    check_state(state)?;
    Ok(compute_tire_forces(state, control, vehicle, tire))
}

/// [`TireModel`] wrapper holding the parameters it needs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PacejkaTireModel {
    pub vehicle: VehicleParameters,
    pub tire: TireParameters,
}

impl PacejkaTireModel {
    pub fn new(vehicle: VehicleParameters, tire: TireParameters) -> Self {
        PacejkaTireModel { vehicle, tire }
    }
}

impl TireModel for PacejkaTireModel {
    fn tire_forces(&self, state: &VehicleState, control: &ControlInput) -> TireForces {
        compute_tire_forces(state, control, &self.vehicle, &self.tire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(vx: f64, vy: f64, yaw_rate: f64, steer_angle: f64) -> VehicleState {
        VehicleState {
            vx,
            vy,
            yaw_rate,
            steer_angle,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_slip_gives_zero_lateral_force() {
        let s = state(12.0, 0.0, 0.0, 0.0);
        let vehicle = VehicleParameters::default();
        let slip = slip_angles(&s, &vehicle);
        assert_eq!(slip.front, 0.0);
        assert_eq!(slip.rear, 0.0);

        let forces = compute_tire_forces(
            &s,
            &ControlInput::new(300.0, 0.0),
            &vehicle,
            &TireParameters::default(),
        );
        assert_eq!(forces.front_lateral, 0.0);
        assert_eq!(forces.rear_lateral, 0.0);
    }

    #[test]
    fn test_slip_angle_formulas() {
        let vehicle = VehicleParameters::default();
        let s = state(10.0, 1.0, 0.2, 0.05);
        let slip = slip_angles(&s, &vehicle);

        // alpha_f = 0.05 - atan((0.2 * 0.88392 + 1.0) / 10)
        let expected_front = 0.05 - ((0.2 * 0.88392 + 1.0) / 10.0_f64).atan();
        // alpha_r = atan((0.2 * 1.50876 - 1.0) / 10)
        let expected_rear = ((0.2 * 1.50876 - 1.0) / 10.0_f64).atan();
        assert_relative_eq!(slip.front, expected_front, max_relative = 1e-12);
        assert_relative_eq!(slip.rear, expected_rear, max_relative = 1e-12);
    }

    #[test]
    fn test_lateral_force_is_odd_and_bounded_by_peak() {
        let tire = TireParameters::default();
        for alpha in [0.01, 0.05, 0.2, 0.8] {
            let fy = pacejka_lateral_force(alpha, tire.rear_peak, tire.rear_shape, tire.rear_stiffness);
            let fy_neg =
                pacejka_lateral_force(-alpha, tire.rear_peak, tire.rear_shape, tire.rear_stiffness);
            assert_relative_eq!(fy, -fy_neg);
            assert!(fy.abs() <= tire.rear_peak);
        }
    }

    #[test]
    fn test_longitudinal_force_uses_drag_sign_as_given() {
        let tire = TireParameters::default();
        // 0.9459 * 500 - 2.3451 + 0.0095 * 225
        assert_relative_eq!(longitudinal_force(500.0, 15.0, &tire), 472.7424, max_relative = 1e-9);
        // vx^2 makes the drag term independent of travel direction
        assert_relative_eq!(
            longitudinal_force(500.0, -15.0, &tire),
            longitudinal_force(500.0, 15.0, &tire)
        );
    }

    #[test]
    fn test_torque_split_boundaries() {
        let vehicle = VehicleParameters::default();
        let s = state(8.0, 0.3, 0.1, 0.02);

        for drive_force in [-800.0, 0.0, 250.0, 1500.0] {
            let control = ControlInput::new(drive_force, 0.0);

            let rwd = compute_tire_forces(&s, &control, &vehicle, &TireParameters::default());
            assert_eq!(rwd.front_longitudinal, 0.0);

            let fwd = compute_tire_forces(
                &s,
                &control,
                &vehicle,
                &TireParameters::default().with_torque_split(1.0),
            );
            assert_eq!(fwd.rear_longitudinal, 0.0);
            assert_relative_eq!(fwd.front_longitudinal, rwd.rear_longitudinal);
        }
    }

    #[test]
    fn test_split_preserves_total() {
        let tire = TireParameters::default().with_torque_split(0.35);
        let s = state(20.0, 0.0, 0.0, 0.0);
        let forces =
            compute_tire_forces(&s, &ControlInput::new(900.0, 0.0), &VehicleParameters::default(), &tire);
        assert_relative_eq!(
            forces.total_longitudinal(),
            longitudinal_force(900.0, 20.0, &tire),
            max_relative = 1e-12
        );
        assert_relative_eq!(forces.front_longitudinal, 0.35 * forces.total_longitudinal(), max_relative = 1e-12);
    }

    #[test]
    fn test_standstill_is_not_finite() {
        let vehicle = VehicleParameters::default();
        let s = state(0.0, 0.0, 0.0, 0.0);
        let slip = slip_angles(&s, &vehicle);
        assert!(!slip.front.is_finite());
        assert!(!slip.rear.is_finite());

        let forces =
            compute_tire_forces(&s, &ControlInput::default(), &vehicle, &TireParameters::default());
        assert!(!forces.front_lateral.is_finite());
        assert!(!forces.rear_lateral.is_finite());
    }

    #[test]
    fn test_checked_rejects_standstill() {
        let s = state(0.0, 0.0, 0.0, 0.0);
        let result = try_compute_tire_forces(
            &s,
            &ControlInput::default(),
            &VehicleParameters::default(),
            &TireParameters::default(),
        );
        assert!(matches!(result, Err(ModelError::StandstillSingularity { .. })));
    }

    #[test]
    fn test_checked_rejects_non_finite_state() {
        let mut s = state(5.0, 0.0, 0.0, 0.0);
        s.vy = f64::INFINITY;
        let result = try_compute_tire_forces(
            &s,
            &ControlInput::default(),
            &VehicleParameters::default(),
            &TireParameters::default(),
        );
        assert!(matches!(result, Err(ModelError::NonFiniteState { field: "vy" })));
    }

    #[test]
    fn test_checked_matches_unchecked() {
        let vehicle = VehicleParameters::default();
        let tire = TireParameters::default().with_torque_split(0.5);
        let s = state(-6.0, 0.4, -0.3, 0.1);
        let control = ControlInput::new(-200.0, 0.0);
        let checked = try_compute_tire_forces(&s, &control, &vehicle, &tire).unwrap();
        assert_eq!(checked, compute_tire_forces(&s, &control, &vehicle, &tire));
    }

    #[test]
    fn test_model_wrapper_delegates() {
        let model = PacejkaTireModel::default();
        let s = state(10.0, 1.0, 0.2, 0.05);
        let control = ControlInput::new(100.0, 0.0);
        assert_eq!(
            model.tire_forces(&s, &control),
            compute_tire_forces(&s, &control, &model.vehicle, &model.tire)
        );
    }

    #[test]
    fn test_validate_torque_split_range() {
        assert!(TireParameters::default().validate().is_ok());
        let err = TireParameters::default().with_torque_split(1.2).validate();
        assert!(matches!(err, Err(ModelError::InvalidParameter { name: "torque_split", .. })));
    }
}
