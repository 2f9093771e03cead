//! Interactive 3D globe of the world's countries.
//!
//! Borders and labels come from a TopoJSON or GeoJSON file; hovering
//! highlights a border, clicking or searching a country fetches its
//! population, area and GDP and shows them in a panel.

pub mod camera;
pub mod debug;
pub mod error;
pub mod geojson;
pub mod info;
pub mod interaction;
pub mod labels;
pub mod names;
pub mod picking;
pub mod projection;
pub mod scene;
pub mod settings;
pub mod travel;
pub mod types;
pub mod ui;
pub mod viewer;

use bevy::prelude::*;

use camera::CameraSystemPlugin;
use debug::DebugPlugin;
use geojson::BordersPlugin;
use info::InfoPlugin;
use interaction::InteractionSystemPlugin;
use labels::LabelsPlugin;
use scene::ScenePlugin;
use ui::GlobeUiPlugin;

/// Everything except the window, egui and settings, which the binary sets up.
pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            ScenePlugin,
            BordersPlugin,
            CameraSystemPlugin,
            InfoPlugin,
            InteractionSystemPlugin,
            LabelsPlugin,
            GlobeUiPlugin,
            DebugPlugin,
        ));
    }
}
