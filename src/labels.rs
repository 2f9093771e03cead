//! Country names drawn over the globe.
//!
//! Each label is a UI text node anchored to a point above its country.
//! Every frame the anchor is carried along with the globe's rotation,
//! projected into the viewport and the text is sized as if it were a
//! billboard of fixed world height facing the camera.

use bevy::{prelude::*, ui::UiSystem, window::PrimaryWindow};

use crate::{scene::Earth, settings::GlobeSettings};

/// Smallest font size worth drawing.
const MIN_FONT_PX: f32 = 4.0;

#[derive(Component, Debug, Clone)]
pub struct CountryLabel {
    pub country: String,
    /// Anchor in the globe's local frame.
    pub anchor: Vec3,
}

/// Labels get bigger on narrow windows.
pub fn label_scale(window_width: f32, settings: &GlobeSettings) -> f32 {
    if window_width < settings.narrow_window_width {
        settings.narrow_label_scale
    } else {
        1.0
    }
}

/// Pixel height of something `world_size` tall at `distance` from a
/// perspective camera.
pub fn label_font_px(world_size: f32, distance: f32, fov: f32, viewport_height: f32) -> f32 {
    if distance <= f32::EPSILON {
        return 0.0;
    }
    world_size * viewport_height / (2.0 * (fov / 2.0).tan() * distance)
}

/// Where a label anchor is after the globe's current rotation.
pub fn anchor_in_world(globe: &Transform, anchor: Vec3) -> Vec3 {
    globe.transform_point(anchor)
}

/// A point on the globe is visible when its outward normal points toward
/// the camera.
pub fn faces_camera(point: Vec3, globe_center: Vec3, camera: Vec3) -> bool {
    (point - globe_center).dot(camera - point) > 0.0
}

fn place_labels(
    settings: Res<GlobeSettings>,
    window: Query<&Window, With<PrimaryWindow>>,
    camera: Query<(&Camera, &Transform, &Projection)>,
    earth: Query<&Transform, With<Earth>>,
    mut labels: Query<(
        &CountryLabel,
        &mut Node,
        &mut TextFont,
        &mut Visibility,
        &ComputedNode,
    )>,
) {
    let (Ok(window), Ok((camera, camera_transform, projection)), Ok(earth)) =
        (window.single(), camera.single(), earth.single())
    else {
        return;
    };
    let fov = match projection {
        Projection::Perspective(perspective) => perspective.fov,
        _ => std::f32::consts::FRAC_PI_3,
    };

    let scale = label_scale(window.width(), &settings);
    let world_size = settings.label_font_size * scale;
    // Globe and camera are root entities, so this frame's `Transform` is
    // already their world placement; `GlobalTransform` lags until propagation.
    let camera_transform = GlobalTransform::from(*camera_transform);
    let camera_position = camera_transform.translation();
    let globe_center = earth.translation;

    for (label, mut node, mut font, mut visibility, computed) in &mut labels {
        let anchor = anchor_in_world(earth, label.anchor);

        let screen = if faces_camera(anchor, globe_center, camera_position) {
            camera.world_to_viewport(&camera_transform, anchor).ok()
        } else {
            None
        };
        let Some(screen) = screen else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };

        let px = label_font_px(
            world_size,
            anchor.distance(camera_position),
            fov,
            window.height(),
        );
        if px < MIN_FONT_PX {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        }
        if (font.font_size - px).abs() > 0.25 {
            font.font_size = px;
        }

        let size = computed.size() * computed.inverse_scale_factor();
        node.left = Val::Px(screen.x - size.x / 2.0);
        node.top = Val::Px(screen.y - size.y / 2.0);
        visibility.set_if_neq(Visibility::Inherited);
    }
}

pub struct LabelsPlugin;

impl Plugin for LabelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, place_labels.before(UiSystem::Layout));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_windows_scale_labels_up() {
        let settings = GlobeSettings::default();
        assert_eq!(label_scale(599.0, &settings), 1.6);
        assert_eq!(label_scale(600.0, &settings), 1.0);
        assert_eq!(label_scale(1920.0, &settings), 1.0);
    }

    #[test]
    fn font_size_follows_distance() {
        let fov = 60f32.to_radians();
        let near = label_font_px(0.01, 1.0, fov, 800.0);
        let far = label_font_px(0.01, 2.0, fov, 800.0);
        assert!((near - 2.0 * far).abs() < 1e-4);
        // 0.01 world units at distance 1 with a 60 degree lens on 800 px.
        assert!((near - 0.01 * 800.0 / (2.0 * (fov / 2.0).tan())).abs() < 1e-4);
        assert_eq!(label_font_px(0.01, 0.0, fov, 800.0), 0.0);
    }

    #[test]
    fn anchor_follows_this_frames_spin() {
        let mut globe = Transform::default();
        let anchor = Vec3::new(0.65, 0.0, 0.0);
        assert!((anchor_in_world(&globe, anchor) - anchor).length() < 1e-6);

        globe.rotate_y(std::f32::consts::FRAC_PI_2);
        let moved = anchor_in_world(&globe, anchor);
        assert!((moved - Vec3::new(0.0, 0.0, -0.65)).length() < 1e-5);
    }

    #[test]
    fn back_side_is_hidden() {
        let camera = Vec3::new(0.0, 0.0, 2.0);
        assert!(faces_camera(Vec3::new(0.0, 0.0, 0.65), Vec3::ZERO, camera));
        assert!(!faces_camera(Vec3::new(0.0, 0.0, -0.65), Vec3::ZERO, camera));
        assert!(!faces_camera(Vec3::new(0.65, 0.0, 0.0), Vec3::ZERO, camera));
    }
}
