use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
    window::PrimaryWindow,
};

use crate::{
    interaction::EguiBlockInputState,
    settings::GlobeSettings,
    travel::{drive_travel, CameraTravel},
};

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const ZOOM_STEP: f32 = 0.95;
const PIXELS_PER_LINE: f32 = 100.0;

/// Orbit around the origin: drag to rotate, scroll to zoom, no panning.
/// Input moves the targets; the camera eases toward them every frame.
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    target_yaw: f32,
    target_pitch: f32,
    target_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the remaining motion covered per 60 Hz frame.
    pub damping: f32,
}

impl OrbitCamera {
    pub fn new(settings: &GlobeSettings) -> Self {
        let mut orbit = Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: settings.camera_start_distance,
            target_yaw: 0.0,
            target_pitch: 0.0,
            target_distance: settings.camera_start_distance,
            min_distance: settings.camera_min_distance,
            max_distance: settings.camera_max_distance,
            damping: settings.camera_damping,
        };
        orbit.sync_to(Vec3::new(0.0, 0.0, settings.camera_start_distance));
        orbit
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.yaw.cos() * self.pitch.cos(),
            self.distance * self.pitch.sin(),
            self.distance * self.yaw.sin() * self.pitch.cos(),
        )
    }

    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.target_yaw += yaw;
        self.target_pitch = (self.target_pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Positive steps zoom in.
    pub fn zoom(&mut self, steps: f32) {
        self.target_distance =
            (self.target_distance * ZOOM_STEP.powf(steps)).clamp(self.min_distance, self.max_distance);
    }

    pub fn step(&mut self, dt: f32) {
        let k = if self.damping <= 0.0 {
            1.0
        } else {
            1.0 - (1.0 - self.damping.min(1.0)).powf(dt * 60.0)
        };
        self.yaw += (self.target_yaw - self.yaw) * k;
        self.pitch += (self.target_pitch - self.pitch) * k;
        self.distance += (self.target_distance - self.distance) * k;
    }

    /// Puts the camera at `position` with nothing left to ease toward.
    pub fn sync_to(&mut self, position: Vec3) {
        let distance = position.length().clamp(self.min_distance, self.max_distance);
        let direction = position.normalize_or(Vec3::Z);
        self.yaw = direction.z.atan2(direction.x).rem_euclid(TAU);
        self.pitch = direction.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = distance;
        self.target_yaw = self.yaw;
        self.target_pitch = self.pitch;
        self.target_distance = distance;
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(Vec3::ZERO, Vec3::Y)
    }
}

fn setup_orbit(
    mut commands: Commands,
    settings: Res<GlobeSettings>,
    camera: Query<Entity, With<Camera3d>>,
) {
    for entity in &camera {
        commands.entity(entity).insert(OrbitCamera::new(&settings));
    }
}

fn orbit_input(
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    state: Res<EguiBlockInputState>,
    travel: Res<CameraTravel>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut query: Query<&mut OrbitCamera>,
) {
    if state.block_input || travel.is_active() {
        return;
    }
    let height = window
        .single()
        .map(|window| window.height())
        .unwrap_or(720.0)
        .max(1.0);

    for mut orbit in &mut query {
        if buttons.pressed(MouseButton::Left) && motion.delta != Vec2::ZERO {
            // A drag across the full window height turns the globe once.
            let turn = TAU * motion.delta / height;
            orbit.rotate(turn.x, turn.y);
        }

        let lines = match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y,
            MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_LINE,
        };
        if lines != 0.0 {
            orbit.zoom(lines);
        }
    }
}

fn apply_orbit(
    time: Res<Time>,
    travel: Res<CameraTravel>,
    mut query: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    if travel.is_active() {
        return;
    }
    for (mut orbit, mut transform) in &mut query {
        orbit.step(time.delta_secs());
        *transform = orbit.transform();
    }
}

pub struct CameraSystemPlugin;

impl Plugin for CameraSystemPlugin {
    fn build(&self, app: &mut App) {
        let travel = app
            .world()
            .get_resource::<GlobeSettings>()
            .map(|s| CameraTravel::new(s.travel_seconds, s.travel_hold_seconds))
            .unwrap_or_default();

        app.insert_resource(travel)
            .add_systems(PostStartup, setup_orbit)
            .add_systems(Update, (orbit_input, drive_travel, apply_orbit).chain());
    }
}
