use bevy::math::{DVec3, Vec3};

/// Maps a latitude/longitude (degrees) onto a sphere of `radius`.
///
/// Longitude is offset by 180° and the x axis is mirrored so that the
/// textured globe, the border loops and the camera targets all agree.
pub fn project(lat: f64, lon: f64, radius: f64) -> DVec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();

    DVec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Single precision shorthand for render-side call sites.
pub fn project_f32(lat: f64, lon: f64, radius: f64) -> Vec3 {
    project(lat, lon, radius).as_vec3()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projected_points_lie_on_the_sphere() {
        let radius = 0.602;
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let p = project(lat, lon, radius);
                assert!(
                    (p.length() - radius).abs() < 1e-12,
                    "({lat}, {lon}) -> {p:?} has length {}",
                    p.length()
                );
                lon += 7.5;
            }
            lat += 5.0;
        }
    }

    #[test]
    fn poles_map_to_the_y_axis() {
        let north = project(90.0, 12.0, 1.0);
        let south = project(-90.0, -140.0, 1.0);
        assert!((north - DVec3::Y).length() < 1e-12);
        assert!((south + DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn greenwich_equator_faces_positive_x() {
        // theta = 180° so -cos(theta) = 1
        let p = project(0.0, 0.0, 2.0);
        assert!((p - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);

        let east = project(0.0, 90.0, 1.0);
        assert!((east - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn single_precision_matches() {
        let d = project(48.85, 2.35, 0.65);
        let f = project_f32(48.85, 2.35, 0.65);
        assert!((d.as_vec3() - f).length() == 0.0);
    }
}
