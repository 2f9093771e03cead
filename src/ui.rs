use bevy::prelude::*;
use bevy_egui::{
    egui::{self, Color32, RichText},
    EguiContexts, EguiPreUpdateSet,
};

use crate::{
    interaction::{InfoPanel, MessageBanner, SearchSubmitted},
    settings::GlobeSettings,
    types::CountryInfo,
};

const SEARCH_WIDTH: f32 = 260.0;
const PANEL_WIDTH: f32 = 240.0;

/// Contents of the search box.
#[derive(Resource, Default)]
pub struct SearchBox {
    pub text: String,
}

fn panel_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(Color32::from_rgba_premultiplied(30, 30, 30, 220))
        .corner_radius(10.0)
        .inner_margin(egui::Margin::same(8))
        .shadow(egui::epaint::Shadow {
            color: Color32::from_black_alpha(60),
            offset: [5, 5],
            blur: 10,
            spread: 5,
        })
}

fn install_loaders(mut contexts: EguiContexts, mut installed: Local<bool>) {
    if *installed {
        return;
    }
    if let Some(ctx) = contexts.try_ctx_mut() {
        egui_extras::install_image_loaders(ctx);
        *installed = true;
    }
}

fn search_ui(
    mut contexts: EguiContexts,
    mut search: ResMut<SearchBox>,
    banner: Res<MessageBanner>,
    mut submitted: EventWriter<SearchSubmitted>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };

    let screen_rect = ctx.screen_rect();
    let pos = egui::pos2((screen_rect.width() - SEARCH_WIDTH) / 2.0, 10.0);

    egui::Area::new("search".into())
        .fixed_pos(pos)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(SEARCH_WIDTH);
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut search.text)
                            .hint_text("Search country...")
                            .desired_width(SEARCH_WIDTH - 80.0),
                    );
                    let entered =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Search").clicked() || entered {
                        submitted.write(SearchSubmitted(search.text.clone()));
                    }
                });

                if let Some(text) = banner.text() {
                    ui.label(RichText::new(text).color(Color32::from_rgb(255, 99, 71)));
                }
            });
        });
}

fn info_panel_ui(
    mut contexts: EguiContexts,
    mut panel: ResMut<InfoPanel>,
    settings: Res<GlobeSettings>,
) {
    let Some(info) = panel.info.clone() else {
        return;
    };
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };

    let screen_rect = ctx.screen_rect();
    let pos = egui::pos2(screen_rect.width() - PANEL_WIDTH - 26.0, 10.0);
    let mut close = false;

    egui::Area::new("country_info".into())
        .fixed_pos(pos)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_width(PANEL_WIDTH);
                ui.horizontal(|ui| {
                    ui.heading(RichText::new(&info.name).color(Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        close = ui.button("✕").clicked();
                    });
                });

                if !info.code.is_empty() {
                    ui.add(
                        egui::Image::new(info.flag_cdn_url(&settings.flag_cdn_url))
                            .max_width(80.0)
                            .alt_text(format!("{} flag", info.name)),
                    );
                }

                info_grid(ui, &info);
            });
        });

    if close {
        panel.hide();
    }
}

fn info_grid(ui: &mut egui::Ui, info: &CountryInfo) {
    let gdp_label = match &info.gdp_year {
        Some(year) => format!("GDP ({year})"),
        None => "GDP".to_string(),
    };

    egui::Grid::new("country_info_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Population");
            ui.label(RichText::new(&info.population).color(Color32::WHITE));
            ui.end_row();

            ui.label("Area");
            ui.label(RichText::new(&info.area).color(Color32::WHITE));
            ui.end_row();

            ui.label(gdp_label);
            ui.label(RichText::new(&info.gdp).color(Color32::WHITE));
            ui.end_row();
        });
}

pub struct GlobeUiPlugin;

impl Plugin for GlobeUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SearchBox>().add_systems(
            Update,
            (install_loaders, search_ui, info_panel_ui)
                .chain()
                .after(EguiPreUpdateSet::InitContexts),
        );
    }
}
