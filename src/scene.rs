use bevy::{
    asset::RenderAssetUsages,
    image::ImageLoaderSettings,
    prelude::*,
    render::mesh::{Indices, PrimitiveTopology},
};

use crate::{projection::project_f32, settings::GlobeSettings};

const SECTORS: u32 = 64;
const STACKS: u32 = 32;

#[derive(Component)]
pub struct Earth;

#[derive(Component)]
pub struct Clouds;

#[derive(Component)]
pub struct Stars;

/// Rotation about the world Y axis in radians per second.
#[derive(Component, Debug, Clone, Copy)]
pub struct Spin(pub f32);

/// Latitude/longitude grid sphere laid out with the same projection as the
/// borders, so an equirectangular texture lines up with them.
pub fn globe_mesh(radius: f64, sectors: u32, stacks: u32) -> Mesh {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let vertex_count = ((sectors + 1) * (stacks + 1)) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for i in 0..=stacks {
        let v = i as f64 / stacks as f64;
        let lat = 90.0 - 180.0 * v;
        for j in 0..=sectors {
            let u = j as f64 / sectors as f64;
            let lon = -180.0 + 360.0 * u;
            let p = project_f32(lat, lon, radius);
            positions.push(p.to_array());
            normals.push(p.normalize_or_zero().to_array());
            uvs.push([u as f32, v as f32]);
        }
    }

    let row = sectors + 1;
    let mut indices = Vec::with_capacity((sectors * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..sectors {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

fn setup_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<GlobeSettings>,
) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 60f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, settings.camera_start_distance)
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let mut earth_mesh = globe_mesh(settings.earth_radius, SECTORS, STACKS);
    if let Err(e) = earth_mesh.generate_tangents() {
        warn!("Earth normal map disabled: {e}");
    }
    let earth_material = StandardMaterial {
        base_color_texture: Some(asset_server.load("textures/2k_earth_daymap.jpg")),
        normal_map_texture: Some(asset_server.load_with_settings(
            "textures/2k_earth_normal_map.jpg",
            |s: &mut ImageLoaderSettings| s.is_srgb = false,
        )),
        perceptual_roughness: 0.8,
        reflectance: 0.2,
        ..default()
    };
    commands.spawn((
        Mesh3d(meshes.add(earth_mesh)),
        MeshMaterial3d(materials.add(earth_material)),
        Transform::default(),
        Earth,
        Spin(settings.earth_spin),
    ));

    commands.spawn((
        Mesh3d(meshes.add(globe_mesh(settings.cloud_radius, SECTORS, STACKS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, 0.5),
            base_color_texture: Some(asset_server.load("textures/2k_earth_clouds.jpg")),
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::default(),
        Clouds,
        Spin(settings.cloud_spin),
    ));

    // Seen from the inside.
    commands.spawn((
        Mesh3d(meshes.add(globe_mesh(settings.star_radius, SECTORS, STACKS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color_texture: Some(asset_server.load("textures/2k_stars.jpg")),
            unlit: true,
            cull_mode: None,
            ..default()
        })),
        Transform::default(),
        Stars,
        Spin(settings.star_spin),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..default()
    });
    commands.spawn((
        DirectionalLight {
            illuminance: 6_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 3.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spin(time: Res<Time>, mut query: Query<(&Spin, &mut Transform)>) {
    let dt = time.delta_secs();
    for (spin, mut transform) in &mut query {
        transform.rotate_y(spin.0 * dt);
    }
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, setup_scene)
            .add_systems(Update, spin);
    }
}
