use bevy::{prelude::*, window::PrimaryWindow};

use crate::{
    info::{InfoReceiver, InfoWorker, LookupOrigin, LookupResponse},
    names::search_key,
    picking::{highlight_country, PickRay},
    projection::project_f32,
    scene::Earth,
    settings::GlobeSettings,
    travel::CameraTravel,
    types::{CentroidTable, CountryInfo},
    viewer::{GlobeState, GlobeViewer, MaterialPainter},
};

/// Pointer travel (logical pixels) below which a press/release is a click.
pub const CLICK_SLOP: f32 = 4.0;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a country name";
pub const NOT_FOUND_MESSAGE: &str = "Country not found";

#[derive(Resource, Default)]
pub struct EguiBlockInputState {
    pub block_input: bool,
}

fn absorb_egui_inputs(
    mut contexts: bevy_egui::EguiContexts,
    mut state: ResMut<EguiBlockInputState>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    state.block_input = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
}

/// Text submitted from the search bar.
#[derive(Event, Debug, Clone)]
pub struct SearchSubmitted(pub String);

/// A search whose lookup succeeded; the country gets highlighted.
#[derive(Event, Debug, Clone)]
pub struct SearchMatched(pub String);

/// The info panel is visible while it holds a record.
#[derive(Resource, Default, Debug)]
pub struct InfoPanel {
    pub info: Option<CountryInfo>,
}

impl InfoPanel {
    pub fn show(&mut self, info: CountryInfo) {
        self.info = Some(info);
    }

    pub fn hide(&mut self) {
        self.info = None;
    }

    pub fn is_visible(&self) -> bool {
        self.info.is_some()
    }
}

/// Short-lived error message under the search bar.
#[derive(Resource, Debug)]
pub struct MessageBanner {
    text: Option<String>,
    timer: Timer,
}

impl MessageBanner {
    pub fn new(seconds: f32) -> Self {
        Self {
            text: None,
            timer: Timer::from_seconds(seconds, TimerMode::Once),
        }
    }

    pub fn show(&mut self, text: &str) {
        self.text = Some(text.to_string());
        self.timer.reset();
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn tick(&mut self, delta: std::time::Duration) {
        if self.text.is_some() && self.timer.tick(delta).finished() {
            self.text = None;
        }
    }
}

impl Default for MessageBanner {
    fn default() -> Self {
        Self::new(GlobeSettings::default().message_seconds)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchError {
    Empty,
    NotFound,
}

impl SearchError {
    pub fn message(&self) -> &'static str {
        match self {
            SearchError::Empty => EMPTY_QUERY_MESSAGE,
            SearchError::NotFound => NOT_FOUND_MESSAGE,
        }
    }
}

/// Matches the query against the centroid table ignoring case and spaces.
pub fn resolve_search<'a>(query: &str, centroids: &'a CentroidTable) -> Result<&'a str, SearchError> {
    let key = search_key(query);
    if key.is_empty() {
        return Err(SearchError::Empty);
    }
    centroids
        .find_by_normalized_key(&key)
        .ok_or(SearchError::NotFound)
}

/// Puts a lookup result on screen. Returns whether the panel was shown.
pub fn apply_lookup(
    response: LookupResponse,
    panel: &mut InfoPanel,
    banner: &mut MessageBanner,
) -> bool {
    match response.info {
        Some(info) => {
            panel.show(info);
            true
        }
        None => {
            banner.show(NOT_FOUND_MESSAGE);
            false
        }
    }
}

pub fn is_click(press: Vec2, release: Vec2) -> bool {
    press.distance(release) < CLICK_SLOP
}

/// Where the left button went down, if it did so over the globe view.
#[derive(Resource, Default)]
struct PointerGesture {
    press: Option<Vec2>,
}

/// Pointer ray in the globe's local frame.
fn globe_ray(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    earth: &GlobalTransform,
    cursor: Vec2,
) -> Option<PickRay> {
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    Some(PickRay::from(ray).to_local(&earth.affine()))
}

fn hover_borders(
    mut cursor_moved: EventReader<CursorMoved>,
    state: Res<EguiBlockInputState>,
    camera: Query<(&Camera, &GlobalTransform)>,
    earth: Query<&GlobalTransform, With<Earth>>,
    settings: Res<GlobeSettings>,
    mut viewer: ResMut<GlobeViewer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(cursor) = cursor_moved.read().last().map(|e| e.position) else {
        return;
    };
    let (Ok((camera, camera_transform)), Ok(earth)) = (camera.single(), earth.single()) else {
        return;
    };

    let viewer = &mut *viewer;
    let pick = if state.block_input {
        None
    } else {
        globe_ray(camera, camera_transform, earth, cursor)
            .and_then(|ray| viewer.hit_index.pick(&ray))
            .map(|hit| hit.ring)
    };

    let mut painter = MaterialPainter {
        materials: &mut materials,
        handles: &viewer.ring_materials,
        base: settings.border_color(),
        highlight: settings.highlight_color(),
    };
    viewer.hover.update(pick, &mut painter);
}

fn click_borders(
    buttons: Res<ButtonInput<MouseButton>>,
    state: Res<EguiBlockInputState>,
    window: Query<&Window, With<PrimaryWindow>>,
    camera: Query<(&Camera, &GlobalTransform)>,
    earth: Query<&GlobalTransform, With<Earth>>,
    settings: Res<GlobeSettings>,
    viewer: Res<GlobeViewer>,
    mut gesture: ResMut<PointerGesture>,
    mut worker: ResMut<InfoWorker>,
) {
    let Ok(window) = window.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if buttons.just_pressed(MouseButton::Left) {
        gesture.press = if state.block_input { None } else { cursor };
    }
    if !buttons.just_released(MouseButton::Left) {
        return;
    }
    let (Some(press), Some(release)) = (gesture.press.take(), cursor) else {
        return;
    };
    if !is_click(press, release) {
        return;
    }
    let (Ok((camera, camera_transform)), Ok(earth)) = (camera.single(), earth.single()) else {
        return;
    };

    let Some(ray) = globe_ray(camera, camera_transform, earth, release) else {
        return;
    };
    let hit = viewer.hit_index.pick_on_globe(
        &ray,
        settings.earth_radius as f32,
        settings.occlusion_tolerance,
    );
    if let Some(country) = hit.and_then(|hit| viewer.hit_index.country(hit.ring)) {
        debug!("Clicked {country}");
        worker.queue_lookup(country, LookupOrigin::Click);
    }
}

fn submit_search(
    mut searches: EventReader<SearchSubmitted>,
    viewer: Res<GlobeViewer>,
    mut worker: ResMut<InfoWorker>,
    mut banner: ResMut<MessageBanner>,
) {
    for SearchSubmitted(query) in searches.read() {
        match resolve_search(query, &viewer.centroids) {
            Ok(country) => {
                worker.queue_lookup(country, LookupOrigin::Search);
            }
            Err(e) => banner.show(e.message()),
        }
    }
}

fn receive_lookups(
    receiver: Res<InfoReceiver>,
    worker: Res<InfoWorker>,
    mut panel: ResMut<InfoPanel>,
    mut banner: ResMut<MessageBanner>,
    mut matched: EventWriter<SearchMatched>,
) {
    for response in receiver.try_iter() {
        if !worker.is_current(response.token) {
            debug!("Dropping stale info for {}", response.country);
            continue;
        }
        let country = response.country.clone();
        let origin = response.origin;
        if apply_lookup(response, &mut panel, &mut banner) && origin == LookupOrigin::Search {
            matched.write(SearchMatched(country));
        }
    }
}

fn highlight_search_match(
    mut matched: EventReader<SearchMatched>,
    settings: Res<GlobeSettings>,
    earth: Query<&GlobalTransform, With<Earth>>,
    camera: Query<&Transform, With<Camera3d>>,
    mut viewer: ResMut<GlobeViewer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut travel: ResMut<CameraTravel>,
) {
    let viewer = &mut *viewer;
    for SearchMatched(country) in matched.read() {
        let mut painter = MaterialPainter {
            materials: &mut materials,
            handles: &viewer.ring_materials,
            base: settings.border_color(),
            highlight: settings.highlight_color(),
        };
        highlight_country(&viewer.hit_index, country, &mut painter);

        if !settings.travel_on_search {
            continue;
        }
        let (Some(centroid), Ok(earth), Ok(camera)) =
            (viewer.centroids.get(country), earth.single(), camera.single())
        else {
            continue;
        };
        let local = project_f32(centroid.lat, centroid.lon, settings.travel_altitude);
        travel.start(camera.translation, earth.affine().transform_point3(local));
    }
}

fn close_on_escape(keys: Res<ButtonInput<KeyCode>>, mut panel: ResMut<InfoPanel>) {
    if keys.just_pressed(KeyCode::Escape) {
        panel.hide();
    }
}

fn tick_messages(time: Res<Time>, mut banner: ResMut<MessageBanner>) {
    banner.tick(time.delta());
}

pub struct InteractionSystemPlugin;

impl Plugin for InteractionSystemPlugin {
    fn build(&self, app: &mut App) {
        let seconds = app
            .world()
            .get_resource::<GlobeSettings>()
            .map(|s| s.message_seconds)
            .unwrap_or(GlobeSettings::default().message_seconds);

        app.insert_resource(EguiBlockInputState::default())
            .insert_resource(MessageBanner::new(seconds))
            .init_resource::<InfoPanel>()
            .init_resource::<PointerGesture>()
            .add_event::<SearchSubmitted>()
            .add_event::<SearchMatched>()
            .add_systems(Update, absorb_egui_inputs)
            .add_systems(
                Update,
                (
                    hover_borders,
                    click_borders,
                    submit_search,
                    receive_lookups,
                    highlight_search_match,
                )
                    .chain()
                    .after(absorb_egui_inputs)
                    .run_if(in_state(GlobeState::Ready)),
            )
            .add_systems(Update, (close_on_escape, tick_messages));
    }
}
