use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::PrimitiveTopology,
};

use crate::labels::CountryLabel;

use super::{BorderRing, LabelSpec};

/// A country border drawn as a line strip around the globe.
#[derive(Component, Debug)]
pub struct BorderMesh {
    pub country: String,
}

/// Line strip through the ring's points, closed by repeating the first one.
pub fn border_mesh(points: &[Vec3]) -> Mesh {
    let mut positions: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
    if let Some(first) = positions.first().copied() {
        positions.push(first);
    }

    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Spawns every ring as a child of `globe` so borders turn with it. Each
/// ring gets its own material so it can be highlighted on its own; the
/// handles come back in ring order.
pub fn spawn_borders(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    globe: Entity,
    borders: &[BorderRing],
    color: Color,
) -> Vec<Handle<StandardMaterial>> {
    let mut handles = Vec::with_capacity(borders.len());

    for border in borders {
        let material = materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            ..default()
        });
        handles.push(material.clone());

        commands.spawn((
            Mesh3d(meshes.add(border_mesh(&border.points))),
            MeshMaterial3d(material),
            Transform::default(),
            BorderMesh {
                country: border.country.clone(),
            },
            ChildOf(globe),
        ));
    }

    handles
}

/// Labels are screen-space text placed every frame by the label system;
/// they start hidden until their first placement.
pub fn spawn_labels(commands: &mut Commands, labels: &[LabelSpec]) {
    for label in labels {
        commands.spawn((
            Text::new(label.country.clone()),
            TextFont {
                font_size: 10.0,
                ..default()
            },
            TextColor(Color::WHITE),
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            Visibility::Hidden,
            CountryLabel {
                country: label.country.clone(),
                anchor: label.anchor,
            },
        ));
    }
}
