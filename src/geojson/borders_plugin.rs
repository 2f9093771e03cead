use bevy::prelude::*;
use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::{
    error::GeodataError,
    scene::Earth,
    settings::GlobeSettings,
    viewer::{GlobeState, GlobeViewer},
};

use super::{load_geodata, spawn_borders, spawn_labels, BorderBuilder, BuildOutput};

#[derive(Resource, Deref)]
pub struct GeodataReceiver(pub Receiver<Result<BuildOutput, GeodataError>>);

/// Reads and projects the geodata on its own thread; the result is picked
/// up by `receive_geodata` once it is ready.
fn start_geodata_load(mut commands: Commands, settings: Res<GlobeSettings>) {
    let (tx, rx) = bounded(1);
    let path = settings.geodata_file();
    let object = settings.topology_object.clone();
    let builder = BorderBuilder::from_settings(&settings);

    info!("Loading geodata from {}", path.display());
    let spawned = std::thread::Builder::new()
        .name("geodata".to_string())
        .spawn(move || {
            let result = load_geodata(&path, &object).map(|features| builder.build(&features));
            let _ = tx.send(result);
        });
    if let Err(e) = spawned {
        error!("Could not start geodata thread: {e}");
    }

    commands.insert_resource(GeodataReceiver(rx));
}

fn receive_geodata(
    mut commands: Commands,
    receiver: Option<Res<GeodataReceiver>>,
    earth: Query<Entity, With<Earth>>,
    settings: Res<GlobeSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut next_state: ResMut<NextState<GlobeState>>,
) {
    let Some(receiver) = receiver else {
        return;
    };
    let Ok(earth) = earth.single() else {
        return;
    };

    let output = match receiver.try_recv() {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            error!("Failed to load geodata: {e}");
            BuildOutput::default()
        }
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => {
            error!("Geodata thread ended without a result");
            BuildOutput::default()
        }
    };
    commands.remove_resource::<GeodataReceiver>();

    info!("Countries loaded: {}", output.centroids.len());
    let ring_materials = spawn_borders(
        &mut commands,
        &mut meshes,
        &mut materials,
        earth,
        &output.borders,
        settings.border_color(),
    );
    info!("Borders added: {}", ring_materials.len());
    spawn_labels(&mut commands, &output.labels);

    commands.insert_resource(GlobeViewer::new(
        output,
        ring_materials,
        settings.pick_threshold,
    ));
    next_state.set(GlobeState::Ready);
}

pub struct BordersPlugin;

impl Plugin for BordersPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GlobeState>()
            .init_resource::<GlobeViewer>()
            .add_systems(Startup, start_geodata_load)
            .add_systems(
                Update,
                receive_geodata.run_if(in_state(GlobeState::Loading)),
            );
    }
}
