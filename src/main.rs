use bevy::{
    log::LogPlugin,
    prelude::*,
    winit::{UpdateMode, WinitSettings},
};
use bevy_egui::EguiPlugin;
use country_globe::{settings::GlobeSettings, GlobePlugin};

fn main() {
    let settings = GlobeSettings::load_or_default();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Country Globe".to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .set(AssetPlugin {
                    file_path: settings.asset_root.clone(),
                    ..Default::default()
                })
                .set(LogPlugin {
                    filter: "info,wgpu=error,naga=warn,country_globe=debug".to_string(),
                    ..Default::default()
                }),
        )
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: false,
        })
        .insert_resource(settings)
        .insert_resource(WinitSettings {
            unfocused_mode: UpdateMode::Reactive {
                wait: std::time::Duration::from_secs(1),
                react_to_device_events: true,
                react_to_user_events: true,
                react_to_window_events: true,
            },
            ..Default::default()
        })
        .add_plugins(GlobePlugin)
        .run();
}
