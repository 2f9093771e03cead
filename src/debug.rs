use bevy::{
    color::palettes::css::GOLD,
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use std::collections::HashSet;

use crate::geojson::BorderMesh;

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        if cfg!(debug_assertions) {
            app.add_plugins(FrameTimeDiagnosticsPlugin::default())
                .add_systems(Startup, (debug_draw_fps, debug_draw_border_count))
                .add_systems(Update, (text_update_fps, text_update_borders));
        }
    }
}

#[derive(Component)]
pub struct FpsText;

#[derive(Component)]
pub struct BorderCountText;

fn overlay_text(label: &str, node: Node, marker: impl Component) -> impl Bundle {
    (
        Text::new(label),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        node,
        children![(
            TextSpan::default(),
            TextFont {
                font_size: 14.0,
                ..default()
            },
            TextColor(GOLD.into()),
            marker,
        )],
    )
}

pub fn debug_draw_fps(mut commands: Commands) {
    commands.spawn(overlay_text(
        "FPS: ",
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(25.0),
            left: Val::Px(5.0),
            ..default()
        },
        FpsText,
    ));
}

pub fn debug_draw_border_count(mut commands: Commands) {
    commands.spawn(overlay_text(
        "Borders: ",
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(5.0),
            left: Val::Px(5.0),
            ..default()
        },
        BorderCountText,
    ));
}

pub fn text_update_fps(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut TextSpan, With<FpsText>>,
) {
    for mut span in &mut query {
        if let Some(value) = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed())
        {
            **span = format!("{value:.2}");
        }
    }
}

/// Border loops and distinct countries among them.
pub fn border_summary<'a>(borders: impl IntoIterator<Item = &'a BorderMesh>) -> (usize, usize) {
    let mut rings = 0;
    let mut countries = HashSet::new();
    for border in borders {
        rings += 1;
        countries.insert(border.country.as_str());
    }
    (rings, countries.len())
}

pub fn text_update_borders(
    added: Query<(), Added<BorderMesh>>,
    borders: Query<&BorderMesh>,
    mut query: Query<&mut TextSpan, With<BorderCountText>>,
) {
    if added.is_empty() {
        return;
    }
    let (rings, countries) = border_summary(&borders);
    for mut span in &mut query {
        **span = format!("{rings} ({countries} countries)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_rings_and_countries() {
        let borders = [
            BorderMesh { country: "Archipelago".into() },
            BorderMesh { country: "Archipelago".into() },
            BorderMesh { country: "Testland".into() },
        ];
        assert_eq!(border_summary(&borders), (3, 2));
        assert_eq!(border_summary(&[] as &[BorderMesh]), (0, 0));
    }
}
