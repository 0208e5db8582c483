// Physics Engine - N-Body Gravitational Integration
// Implements Newtonian N-body gravity, Velocity Verlet integrator, and
// Keplerian element conversion behind the `Integrator` seam

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::error::IntegratorError;
use crate::integrator::Integrator;

// =============================================================================
// PHYSICAL CONSTANTS (SI Units)
// =============================================================================

/// Gravitational constant (m³/(kg·s²))
pub const G: f64 = 6.67430e-11;

/// Astronomical Unit in meters
pub const AU: f64 = 1.495978707e11;

/// Sun mass (kg)
pub const MASS_SUN: f64 = 1.989e30;

/// Earth mass (kg)
pub const MASS_EARTH: f64 = 5.972e24;

/// Separation below which a pair exerts no force on each other (m)
const MIN_SEPARATION: f64 = 1e-10;

// =============================================================================
// 3D VECTOR MATHEMATICS
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 1e-15 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
                z: self.z / mag,
            }
        } else {
            Self::zero()
        }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn add(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    pub fn sub(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

// =============================================================================
// STATE VECTOR (Position + Velocity)
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct StateVector {
    pub position: Vector3, // meters (SI)
    pub velocity: Vector3, // m/s (SI)
}

impl StateVector {
    pub fn new(position: Vector3, velocity: Vector3) -> Self {
        Self { position, velocity }
    }

    pub fn zero() -> Self {
        Self {
            position: Vector3::zero(),
            velocity: Vector3::zero(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

// =============================================================================
// KEPLERIAN ORBITAL ELEMENTS
// =============================================================================

/// Osculating elements of a body relative to the primary.
///
/// Either the period or an explicit semi-major axis fixes the orbit size.
/// When both are given the semi-major axis wins. Omitted angles are zero,
/// which places the orbit in the reference plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrbitalElements {
    /// Orbital period (seconds)
    pub period: f64,
    /// Eccentricity (0-1 for elliptical)
    pub eccentricity: f64,
    /// Mean anomaly (radians)
    pub mean_anomaly: f64,
    /// Semi-major axis (meters)
    pub semi_major_axis: Option<f64>,
    /// Inclination (radians)
    pub inclination: Option<f64>,
    /// Argument of periapsis (radians)
    pub argument_periapsis: Option<f64>,
    /// Longitude of ascending node (radians)
    pub longitude_ascending_node: Option<f64>,
}

impl OrbitalElements {
    pub fn new(period: f64, eccentricity: f64, mean_anomaly: f64) -> Self {
        Self {
            period,
            eccentricity,
            mean_anomaly,
            semi_major_axis: None,
            inclination: None,
            argument_periapsis: None,
            longitude_ascending_node: None,
        }
    }

    /// Semi-major axis implied by these elements for the given mu.
    ///
    /// Kepler's third law: a³ = mu * P² / (4π²)
    pub fn resolve_semi_major_axis(&self, mu: f64) -> Result<f64, IntegratorError> {
        let a = match self.semi_major_axis {
            Some(a) => a,
            None => {
                if !(self.period.is_finite() && self.period > 0.0) {
                    return Err(IntegratorError::InvalidElements {
                        reason: format!("period must be positive, got {}", self.period),
                    });
                }
                (mu * self.period * self.period / (4.0 * PI * PI)).cbrt()
            }
        };

        if !(a.is_finite() && a > 0.0) {
            return Err(IntegratorError::InvalidElements {
                reason: format!("semi-major axis must be positive, got {a}"),
            });
        }
        Ok(a)
    }

    /// Convert orbital elements to a Cartesian state vector relative to the
    /// primary, for gravitational parameter `mu = G * (M + m)`.
    pub fn to_state_vector(&self, mu: f64) -> Result<StateVector, IntegratorError> {
        if !(mu.is_finite() && mu > 0.0) {
            return Err(IntegratorError::InvalidElements {
                reason: format!("gravitational parameter must be positive, got {mu}"),
            });
        }
        let e = self.eccentricity;
        if !(0.0..1.0).contains(&e) {
            return Err(IntegratorError::InvalidElements {
                reason: format!("eccentricity must lie in [0, 1), got {e}"),
            });
        }
        let angles = [
            self.mean_anomaly,
            self.inclination.unwrap_or(0.0),
            self.argument_periapsis.unwrap_or(0.0),
            self.longitude_ascending_node.unwrap_or(0.0),
        ];
        if angles.iter().any(|angle| !angle.is_finite()) {
            return Err(IntegratorError::InvalidElements {
                reason: "angles must be finite".to_string(),
            });
        }
        let [m, i, omega_small, omega_big] = angles;
        let a = self.resolve_semi_major_axis(mu)?;

        // Solve Kepler's equation to get Eccentric Anomaly (Newton-Raphson)
        let eccentric_anomaly = solve_kepler_equation(m, e);

        // Calculate True Anomaly
        let cos_e = eccentric_anomaly.cos();
        let true_anomaly = 2.0
            * ((1.0 + e).sqrt() * (eccentric_anomaly / 2.0).sin())
                .atan2((1.0 - e).sqrt() * (eccentric_anomaly / 2.0).cos());

        // Distance from focus
        let r = a * (1.0 - e * cos_e);

        // Position in orbital plane (perifocal frame)
        let cos_nu = true_anomaly.cos();
        let sin_nu = true_anomaly.sin();
        let x_orb = r * cos_nu;
        let y_orb = r * sin_nu;

        // Velocity in orbital plane
        let sqrt_mu_p = (mu / (a * (1.0 - e * e))).sqrt();
        let vx_orb = -sqrt_mu_p * sin_nu;
        let vy_orb = sqrt_mu_p * (e + cos_nu);

        // Rotation from perifocal to the reference frame
        let cos_omega = omega_big.cos();
        let sin_omega = omega_big.sin();
        let cos_w = omega_small.cos();
        let sin_w = omega_small.sin();
        let cos_i = i.cos();
        let sin_i = i.sin();

        let r11 = cos_omega * cos_w - sin_omega * sin_w * cos_i;
        let r12 = -cos_omega * sin_w - sin_omega * cos_w * cos_i;
        let r21 = sin_omega * cos_w + cos_omega * sin_w * cos_i;
        let r22 = -sin_omega * sin_w + cos_omega * cos_w * cos_i;
        let r31 = sin_w * sin_i;
        let r32 = cos_w * sin_i;

        let position = Vector3::new(
            r11 * x_orb + r12 * y_orb,
            r21 * x_orb + r22 * y_orb,
            r31 * x_orb + r32 * y_orb,
        );

        let velocity = Vector3::new(
            r11 * vx_orb + r12 * vy_orb,
            r21 * vx_orb + r22 * vy_orb,
            r31 * vx_orb + r32 * vy_orb,
        );

        Ok(StateVector { position, velocity })
    }
}

/// Solve Kepler's equation M = E - e*sin(E) using Newton-Raphson
fn solve_kepler_equation(mean_anomaly: f64, eccentricity: f64) -> f64 {
    // Starting at pi keeps Newton stable for high eccentricities
    let mut e_anom = if eccentricity > 0.8 { PI } else { mean_anomaly };
    let tolerance = 1e-12;
    let max_iterations = 50;

    for _ in 0..max_iterations {
        let f = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        let delta = f / f_prime;
        e_anom -= delta;

        if delta.abs() < tolerance {
            break;
        }
    }

    e_anom
}

// =============================================================================
// BODIES
// =============================================================================

/// Engine-assigned identifier of a body, stable for the body's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BodyHandle(pub u32);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Body {
    pub handle: BodyHandle,
    pub mass: f64, // kg
    pub state: StateVector,
}

// =============================================================================
// VELOCITY VERLET INTEGRATOR (Symplectic)
// =============================================================================

pub struct VelocityVerletIntegrator {
    /// Time step in seconds (negative steps integrate backwards)
    pub dt: f64,
    /// Gravitational constant used for the force evaluation
    pub g: f64,
}

impl VelocityVerletIntegrator {
    pub fn new(dt: f64, g: f64) -> Self {
        Self { dt, g }
    }

    /// Step the simulation forward by dt
    /// Uses Velocity Verlet: x(t+dt) = x(t) + v(t)*dt + 0.5*a(t)*dt²
    ///                       v(t+dt) = v(t) + 0.5*(a(t) + a(t+dt))*dt
    pub fn step(&self, bodies: &mut [Body]) {
        let dt = self.dt;
        let dt_sq_half = dt * dt * 0.5;

        let accelerations = self.calculate_accelerations(bodies);

        // Update positions: x(t+dt) = x(t) + v(t)*dt + 0.5*a(t)*dt²
        for (body, a) in bodies.iter_mut().zip(&accelerations) {
            let v = body.state.velocity;
            body.state.position = body
                .state
                .position
                .add(&v.scale(dt))
                .add(&a.scale(dt_sq_half));
        }

        let new_accelerations = self.calculate_accelerations(bodies);

        // Update velocities: v(t+dt) = v(t) + 0.5*(a(t) + a(t+dt))*dt
        for ((body, a_old), a_new) in bodies
            .iter_mut()
            .zip(&accelerations)
            .zip(&new_accelerations)
        {
            let avg_accel = a_old.add(a_new).scale(0.5);
            body.state.velocity = body.state.velocity.add(&avg_accel.scale(dt));
        }
    }

    /// Gravitational acceleration of every body from all others
    fn calculate_accelerations(&self, bodies: &[Body]) -> Vec<Vector3> {
        let n = bodies.len();
        let mut accelerations = vec![Vector3::zero(); n];

        // Each pair is visited once and contributes to both bodies
        for i in 0..n {
            for j in (i + 1)..n {
                let r_vec = bodies[j].state.position.sub(&bodies[i].state.position);
                let r = r_vec.magnitude();
                if r <= MIN_SEPARATION {
                    continue;
                }

                let inv_r3 = self.g / (r * r * r);
                accelerations[i] = accelerations[i].add(&r_vec.scale(bodies[j].mass * inv_r3));
                accelerations[j] = accelerations[j].sub(&r_vec.scale(bodies[i].mass * inv_r3));
            }
        }

        accelerations
    }
}

// =============================================================================
// ENERGY CALCULATIONS (for drift monitoring)
// =============================================================================

/// Calculate total mechanical energy of the system
pub fn calculate_total_energy(bodies: &[Body], g: f64) -> f64 {
    let mut kinetic = 0.0;
    let mut potential = 0.0;

    for body in bodies {
        // Kinetic energy: 0.5 * m * v²
        let v = body.state.velocity.magnitude();
        kinetic += 0.5 * body.mass * v * v;
    }

    // Potential energy: -G * m1 * m2 / r for each pair
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let r_vec = bodies[i].state.position.sub(&bodies[j].state.position);
            let r = r_vec.magnitude();
            if r > MIN_SEPARATION {
                potential -= g * bodies[i].mass * bodies[j].mass / r;
            }
        }
    }

    kinetic + potential
}

// =============================================================================
// N-BODY ENGINE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegratorConfig {
    /// Largest step taken while integrating (seconds)
    pub dt: f64,
    /// Gravitational constant (m³/(kg·s²))
    pub gravitational_constant: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            dt: 3600.0, // 1 hour
            gravitational_constant: G,
        }
    }
}

/// Fixed-step Verlet engine with exact finish times.
///
/// `integrate(t)` takes full steps of `config.dt` toward `t` and a final
/// shortened step so the clock lands exactly on `t`. Cloning yields a fully
/// independent engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NBodyEngine {
    pub config: IntegratorConfig,
    time: f64,
    bodies: Vec<Body>,
    next_handle: u32,
}

impl NBodyEngine {
    pub fn new(config: IntegratorConfig) -> Self {
        Self {
            config,
            time: 0.0,
            bodies: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn total_energy(&self) -> f64 {
        calculate_total_energy(&self.bodies, self.config.gravitational_constant)
    }

    /// Number of steps `integrate(time)` would take from the current clock.
    pub fn steps_to(&self, time: f64) -> f64 {
        let span = (time - self.time).abs();
        if span == 0.0 {
            return 0.0;
        }
        (span / self.config.dt.abs()).ceil()
    }

    fn insert(&mut self, mass: f64, state: StateVector) -> Result<BodyHandle, IntegratorError> {
        if !(mass.is_finite() && mass >= 0.0) {
            return Err(IntegratorError::InvalidBody {
                reason: format!("mass must be finite and non-negative, got {mass}"),
            });
        }
        if !state.is_finite() {
            return Err(IntegratorError::InvalidBody {
                reason: "position and velocity must be finite".to_string(),
            });
        }

        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.push(Body {
            handle,
            mass,
            state,
        });
        Ok(handle)
    }
}

impl Default for NBodyEngine {
    fn default() -> Self {
        Self::new(IntegratorConfig::default())
    }
}

impl Integrator for NBodyEngine {
    fn time(&self) -> f64 {
        self.time
    }

    fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.handle == handle)
    }

    fn add_body(&mut self, mass: f64, state: StateVector) -> Result<BodyHandle, IntegratorError> {
        self.insert(mass, state)
    }

    fn add_from_elements(
        &mut self,
        mass: f64,
        elements: &OrbitalElements,
        primary: BodyHandle,
    ) -> Result<BodyHandle, IntegratorError> {
        let primary = self
            .body(primary)
            .ok_or_else(|| IntegratorError::InvalidElements {
                reason: format!("primary {primary} is not part of this simulation"),
            })?;
        let mu = self.config.gravitational_constant * (primary.mass + mass);
        let relative = elements.to_state_vector(mu)?;

        let state = StateVector::new(
            primary.state.position.add(&relative.position),
            primary.state.velocity.add(&relative.velocity),
        );
        self.insert(mass, state)
    }

    fn integrate(&mut self, time: f64) -> Result<(), IntegratorError> {
        if !time.is_finite() {
            return Err(IntegratorError::NonFiniteTime { time });
        }

        let dt = self.config.dt.abs();
        while self.time != time {
            let remaining = time - self.time;
            let mut next = if remaining.abs() > dt {
                self.time + dt.copysign(remaining)
            } else {
                time
            };
            // dt below float resolution at this clock value
            if next == self.time {
                next = time;
            }

            let verlet =
                VelocityVerletIntegrator::new(next - self.time, self.config.gravitational_constant);
            verlet.step(&mut self.bodies);
            self.time = next;

            if self.bodies.iter().any(|b| !b.state.is_finite()) {
                return Err(IntegratorError::Diverged { time: self.time });
            }
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sun_earth() -> NBodyEngine {
        let mut engine = NBodyEngine::default();
        let sun = engine.add_body(MASS_SUN, StateVector::zero()).unwrap();
        let mut elements = OrbitalElements::new(0.0, 0.0167, 0.0);
        elements.semi_major_axis = Some(AU);
        engine
            .add_from_elements(MASS_EARTH, &elements, sun)
            .unwrap();
        engine
    }

    #[test]
    fn test_kepler_equation_circular() {
        // For circular orbit e=0, E = M
        let e = solve_kepler_equation(1.0, 0.0);
        assert!((e - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_kepler_equation_eccentric() {
        let e = solve_kepler_equation(0.5, 0.5);
        // Verify: E - 0.5*sin(E) should equal 0.5
        let check = e - 0.5 * e.sin();
        assert!((check - 0.5).abs() < 1e-10);

        let e = solve_kepler_equation(0.2, 0.95);
        let check = e - 0.95 * e.sin();
        assert!((check - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_circular_elements_give_circular_speed() {
        let mu = G * MASS_SUN;
        let mut elements = OrbitalElements::new(0.0, 0.0, 0.0);
        elements.semi_major_axis = Some(AU);
        let state = elements.to_state_vector(mu).unwrap();

        assert!((state.position.magnitude() - AU).abs() / AU < 1e-12);
        let v_circ = (mu / AU).sqrt();
        assert!((state.velocity.magnitude() - v_circ).abs() / v_circ < 1e-12);
        // Velocity is perpendicular to the radius on a circular orbit
        assert!(state.position.normalize().dot(&state.velocity.normalize()).abs() < 1e-12);
    }

    #[test]
    fn test_period_sets_semi_major_axis() {
        let mu = G * MASS_SUN;
        let year = 365.25 * 86400.0;
        let a = OrbitalElements::new(year, 0.0, 0.0)
            .resolve_semi_major_axis(mu)
            .unwrap();
        assert!((a - AU).abs() / AU < 1e-3, "a = {a}");
    }

    #[test]
    fn test_inclination_lifts_orbit_out_of_plane() {
        let mu = G * MASS_SUN;
        let mut elements = OrbitalElements::new(0.0, 0.0, PI / 2.0);
        elements.semi_major_axis = Some(AU);
        elements.inclination = Some(PI / 2.0);
        let state = elements.to_state_vector(mu).unwrap();
        assert!((state.position.z - AU).abs() / AU < 1e-12);
    }

    #[test]
    fn test_invalid_elements_rejected() {
        let mu = G * MASS_SUN;
        assert!(matches!(
            OrbitalElements::new(1.0e7, 1.2, 0.0).to_state_vector(mu),
            Err(IntegratorError::InvalidElements { .. })
        ));
        assert!(matches!(
            OrbitalElements::new(-5.0, 0.1, 0.0).to_state_vector(mu),
            Err(IntegratorError::InvalidElements { .. })
        ));
        assert!(matches!(
            OrbitalElements::new(1.0e7, 0.1, 0.0).to_state_vector(0.0),
            Err(IntegratorError::InvalidElements { .. })
        ));
    }

    #[test]
    fn test_elements_are_relative_to_primary() {
        let mut engine = NBodyEngine::default();
        let primary_state = StateVector::new(Vector3::new(AU, 0.0, 0.0), Vector3::new(0.0, 30.0e3, 0.0));
        let sun = engine.add_body(MASS_SUN, primary_state).unwrap();
        let mut elements = OrbitalElements::new(0.0, 0.0, 0.0);
        elements.semi_major_axis = Some(1.0e9);
        let handle = engine.add_from_elements(0.0, &elements, sun).unwrap();

        let body = engine.body(handle).unwrap();
        let offset = body.state.position.sub(&primary_state.position);
        assert!((offset.magnitude() - 1.0e9).abs() < 1e-3);
    }

    #[test]
    fn test_circular_orbit_energy_conservation() {
        let mut engine = sun_earth();
        let initial_energy = engine.total_energy();

        // 100 one-hour steps
        engine.integrate(100.0 * 3600.0).unwrap();

        let final_energy = engine.total_energy();
        let drift = ((final_energy - initial_energy) / initial_energy).abs();

        // Energy drift should be very small for symplectic integrator
        assert!(drift < 1e-6, "Energy drift too high: {}", drift);
    }

    #[test]
    fn test_integrate_lands_on_exact_time() {
        let mut engine = sun_earth();
        engine.integrate(5000.0).unwrap();
        assert_eq!(engine.time(), 5000.0);
        engine.integrate(5000.5).unwrap();
        assert_eq!(engine.time(), 5000.5);
    }

    #[test]
    fn test_steps_to_counts_partial_step() {
        let mut engine = sun_earth();
        assert_eq!(engine.steps_to(0.0), 0.0);
        assert_eq!(engine.steps_to(3600.0), 1.0);
        assert_eq!(engine.steps_to(3601.0), 2.0);
        assert_eq!(engine.steps_to(-7200.0), 2.0);

        engine.integrate(7200.0).unwrap();
        assert_eq!(engine.steps_to(3600.0), 1.0);
        assert!(engine.steps_to(1.0e18) > 2.7e14);
    }

    #[test]
    fn test_integrate_backwards_retraces_orbit() {
        let mut engine = sun_earth();
        let start = engine.bodies()[1].state;
        engine.integrate(10.0 * 3600.0).unwrap();
        engine.integrate(0.0).unwrap();

        assert_eq!(engine.time(), 0.0);
        let back = engine.bodies()[1].state;
        assert!(back.position.sub(&start.position).magnitude() < 1.0);
    }

    #[test]
    fn test_non_finite_time_rejected() {
        let mut engine = sun_earth();
        assert!(matches!(
            engine.integrate(f64::NAN),
            Err(IntegratorError::NonFiniteTime { .. })
        ));
        assert_eq!(engine.time(), 0.0);
    }

    #[test]
    fn test_invalid_body_rejected() {
        let mut engine = NBodyEngine::default();
        assert!(engine.add_body(-1.0, StateVector::zero()).is_err());
        let bad = StateVector::new(Vector3::new(f64::INFINITY, 0.0, 0.0), Vector3::zero());
        assert!(engine.add_body(1.0, bad).is_err());
        assert!(engine.bodies().is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let engine = sun_earth();
        let mut copy = engine.clone();
        copy.integrate(86400.0).unwrap();

        assert_eq!(engine.time(), 0.0);
        assert_ne!(engine.bodies()[1].state, copy.bodies()[1].state);
    }

    #[test]
    fn test_vector3_operations() {
        let v1 = Vector3::new(1.0, 2.0, 3.0);
        let v2 = Vector3::new(4.0, 5.0, 6.0);

        // Addition
        let sum = v1.add(&v2);
        assert!((sum.x - 5.0).abs() < 1e-10);
        assert!((sum.y - 7.0).abs() < 1e-10);
        assert!((sum.z - 9.0).abs() < 1e-10);

        // Dot product
        let dot = v1.dot(&v2);
        assert!((dot - 32.0).abs() < 1e-10);

        // Normalization
        let unit = v2.normalize();
        assert!((unit.magnitude() - 1.0).abs() < 1e-12);
        assert_eq!(Vector3::zero().normalize(), Vector3::zero());
    }
}
