use bevy::prelude::*;

use crate::{camera::OrbitCamera, settings::GlobeSettings};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TravelPhase {
    #[default]
    Idle,
    Approaching { elapsed: f32 },
    Holding { elapsed: f32 },
    Returning { elapsed: f32 },
}

/// Flies the camera to a point above a country, waits, then flies back to
/// where it started. Driven by `tick` once per frame.
#[derive(Resource, Debug, Clone)]
pub struct CameraTravel {
    phase: TravelPhase,
    home: Vec3,
    from: Vec3,
    target: Vec3,
    duration: f32,
    hold: f32,
}

impl Default for CameraTravel {
    fn default() -> Self {
        let settings = GlobeSettings::default();
        Self::new(settings.travel_seconds, settings.travel_hold_seconds)
    }
}

impl CameraTravel {
    pub fn new(duration: f32, hold: f32) -> Self {
        Self {
            phase: TravelPhase::Idle,
            home: Vec3::ZERO,
            from: Vec3::ZERO,
            target: Vec3::ZERO,
            duration,
            hold,
        }
    }

    pub fn phase(&self) -> TravelPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != TravelPhase::Idle
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    /// Starts a trip from `current`. A trip already under way is abandoned
    /// where it is, but the camera still returns to the first trip's home.
    pub fn start(&mut self, current: Vec3, target: Vec3) {
        if !self.is_active() {
            self.home = current;
        }
        self.from = current;
        self.target = target;
        self.phase = TravelPhase::Approaching { elapsed: 0.0 };
    }

    pub fn cancel(&mut self) {
        self.phase = TravelPhase::Idle;
    }

    /// Advances by `dt` seconds and returns where the camera should be, or
    /// `None` when idle.
    pub fn tick(&mut self, dt: f32) -> Option<Vec3> {
        match self.phase {
            TravelPhase::Idle => None,
            TravelPhase::Approaching { elapsed } => {
                let elapsed = elapsed + dt;
                let k = self.progress(elapsed);
                self.phase = if k >= 1.0 {
                    TravelPhase::Holding { elapsed: 0.0 }
                } else {
                    TravelPhase::Approaching { elapsed }
                };
                Some(self.from.lerp(self.target, ease_out_cubic(k)))
            }
            TravelPhase::Holding { elapsed } => {
                let elapsed = elapsed + dt;
                self.phase = if elapsed >= self.hold {
                    TravelPhase::Returning { elapsed: 0.0 }
                } else {
                    TravelPhase::Holding { elapsed }
                };
                Some(self.target)
            }
            TravelPhase::Returning { elapsed } => {
                let elapsed = elapsed + dt;
                let k = self.progress(elapsed);
                self.phase = if k >= 1.0 {
                    TravelPhase::Idle
                } else {
                    TravelPhase::Returning { elapsed }
                };
                Some(self.target.lerp(self.home, ease_out_cubic(k)))
            }
        }
    }

    fn progress(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (elapsed / self.duration).min(1.0)
        }
    }
}

pub fn ease_out_cubic(k: f32) -> f32 {
    1.0 - (1.0 - k.clamp(0.0, 1.0)).powi(3)
}

/// Moves the camera while a trip is running and hands control back to the
/// orbit controls once it is over.
pub fn drive_travel(
    time: Res<Time>,
    mut travel: ResMut<CameraTravel>,
    mut camera: Query<(&mut Transform, &mut OrbitCamera)>,
) {
    if !travel.is_active() {
        return;
    }
    let Ok((mut transform, mut orbit)) = camera.single_mut() else {
        return;
    };

    if let Some(position) = travel.tick(time.delta_secs()) {
        *transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
    }
    if !travel.is_active() {
        orbit.sync_to(transform.translation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: Vec3 = Vec3::new(0.0, 0.0, 2.0);
    const TARGET: Vec3 = Vec3::new(1.0, 0.0, 0.0);

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn full_trip_goes_through_every_phase() {
        let mut travel = CameraTravel::new(1.0, 0.5);
        assert_eq!(travel.tick(0.1), None);

        travel.start(HOME, TARGET);
        let first = travel.tick(0.5).unwrap();
        assert!(matches!(travel.phase(), TravelPhase::Approaching { .. }));
        // Ease-out covers more than half the way at the halfway time.
        assert!(first.distance(HOME) > 0.5 * HOME.distance(TARGET));

        assert!(close(travel.tick(0.5).unwrap(), TARGET));
        assert!(matches!(travel.phase(), TravelPhase::Holding { .. }));

        assert!(close(travel.tick(0.3).unwrap(), TARGET));
        assert!(close(travel.tick(0.3).unwrap(), TARGET));
        assert!(matches!(travel.phase(), TravelPhase::Returning { .. }));

        assert!(close(travel.tick(2.0).unwrap(), HOME));
        assert_eq!(travel.phase(), TravelPhase::Idle);
        assert!(!travel.is_active());
    }

    #[test]
    fn new_trip_mid_flight_keeps_home() {
        let mut travel = CameraTravel::new(1.0, 0.0);
        travel.start(HOME, TARGET);
        let midway = travel.tick(0.25).unwrap();

        let other = Vec3::new(0.0, 1.0, 0.0);
        travel.start(midway, other);
        assert_eq!(travel.phase(), TravelPhase::Approaching { elapsed: 0.0 });
        assert!(close(travel.home(), HOME));

        // The new leg starts from where the camera was left.
        assert!(close(travel.tick(0.0).unwrap(), midway));
        assert!(close(travel.tick(1.0).unwrap(), other));
        travel.tick(0.0);
        assert!(close(travel.tick(1.0).unwrap(), HOME));
    }

    #[test]
    fn cancel_stops_immediately() {
        let mut travel = CameraTravel::new(1.0, 1.0);
        travel.start(HOME, TARGET);
        travel.tick(0.2);
        travel.cancel();
        assert_eq!(travel.tick(0.2), None);
    }

    #[test]
    fn zero_duration_jumps() {
        let mut travel = CameraTravel::new(0.0, 0.0);
        travel.start(HOME, TARGET);
        assert!(close(travel.tick(0.016).unwrap(), TARGET));
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }
}
