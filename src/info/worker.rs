use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use bevy_tasks::futures_lite::future;
use crossbeam_channel::{unbounded, Receiver, Sender};
use uuid::Uuid;

use crate::{settings::GlobeSettings, types::CountryInfo};

use super::{CountryInfoClient, CountryInfoSource};

/// What started a lookup. Search results also move the highlight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupOrigin {
    Click,
    Search,
}

#[derive(Clone, Debug)]
pub struct LookupRequest {
    pub token: Uuid,
    pub country: String,
    pub origin: LookupOrigin,
}

#[derive(Clone, Debug)]
pub struct LookupResponse {
    pub token: Uuid,
    pub country: String,
    pub origin: LookupOrigin,
    pub info: Option<CountryInfo>,
}

/// Runs country lookups on the IO pool. Every queued lookup gets a token
/// and only the newest one counts; older results still arrive on the
/// channel and are dropped by the consumer.
#[derive(Resource)]
pub struct InfoWorker {
    source: Arc<dyn CountryInfoSource>,
    pending: Arc<Mutex<VecDeque<LookupRequest>>>,
    max_concurrent: usize,
    active: Arc<AtomicUsize>,
    latest: Option<Uuid>,
    tx: Sender<LookupResponse>,
}

#[derive(Resource, Deref)]
pub struct InfoReceiver(pub Receiver<LookupResponse>);

impl InfoWorker {
    pub fn new(source: Arc<dyn CountryInfoSource>, max_concurrent: usize) -> (Self, InfoReceiver) {
        let (tx, rx) = unbounded();
        let worker = InfoWorker {
            source,
            pending: Arc::new(Mutex::new(VecDeque::new())),
            max_concurrent: max_concurrent.max(1),
            active: Arc::new(AtomicUsize::new(0)),
            latest: None,
            tx,
        };
        (worker, InfoReceiver(rx))
    }

    pub fn queue_lookup(&mut self, country: &str, origin: LookupOrigin) -> Uuid {
        let token = Uuid::new_v4();
        self.latest = Some(token);
        lock(&self.pending).push_back(LookupRequest {
            token,
            country: country.to_string(),
            origin,
        });
        token
    }

    pub fn is_current(&self, token: Uuid) -> bool {
        self.latest == Some(token)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Takes the next request if a slot is free.
    fn start_next(&self) -> Option<LookupRequest> {
        if self.active_count() >= self.max_concurrent {
            return None;
        }
        let request = lock(&self.pending).pop_front()?;
        self.active.fetch_add(1, Ordering::SeqCst);
        Some(request)
    }

    /// Performs one lookup on the calling thread.
    pub fn run(source: &dyn CountryInfoSource, request: LookupRequest) -> LookupResponse {
        let info = source.fetch_info(&request.country);
        LookupResponse {
            token: request.token,
            country: request.country,
            origin: request.origin,
            info,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Component)]
struct LookupTask(Task<()>);

fn process_lookups(mut commands: Commands, worker: Res<InfoWorker>) {
    let task_pool = IoTaskPool::get();

    while let Some(request) = worker.start_next() {
        info!("Looking up {}", request.country);
        let source = worker.source.clone();
        let active = worker.active.clone();
        let tx = worker.tx.clone();

        let task = task_pool.spawn(async move {
            let response = InfoWorker::run(source.as_ref(), request);
            let _ = tx.send(response);
            active.fetch_sub(1, Ordering::SeqCst);
        });

        commands.spawn(LookupTask(task));
    }
}

fn cleanup_tasks(mut commands: Commands, mut tasks: Query<(Entity, &mut LookupTask)>) {
    for (entity, mut task) in tasks.iter_mut() {
        if future::block_on(future::poll_once(&mut task.0)).is_some() {
            commands.entity(entity).despawn();
        }
    }
}

pub struct InfoPlugin;

impl Plugin for InfoPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<GlobeSettings>()
            .cloned()
            .unwrap_or_default();
        let source: Arc<dyn CountryInfoSource> = Arc::new(CountryInfoClient::new(&settings));
        let (worker, receiver) = InfoWorker::new(source, settings.max_concurrent_lookups);

        app.insert_resource(worker)
            .insert_resource(receiver)
            .add_systems(Update, (process_lookups, cleanup_tasks));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Atlas;

    impl CountryInfoSource for Atlas {
        fn fetch_info(&self, name: &str) -> Option<CountryInfo> {
            (name == "France").then(|| CountryInfo {
                name: "France".into(),
                code: "FR".into(),
                flag_url: String::new(),
                population: "68,000,000".into(),
                area: "551,695 km²".into(),
                gdp: "$3,000,000,000,000".into(),
                gdp_year: Some("2023".into()),
            })
        }
    }

    #[test]
    fn newest_token_wins() {
        let (mut worker, _rx) = InfoWorker::new(Arc::new(Atlas), 2);
        let first = worker.queue_lookup("France", LookupOrigin::Click);
        let second = worker.queue_lookup("Spain", LookupOrigin::Search);

        assert_ne!(first, second);
        assert!(!worker.is_current(first));
        assert!(worker.is_current(second));
        assert_eq!(worker.pending_count(), 2);
    }

    #[test]
    fn concurrency_is_capped() {
        let (mut worker, _rx) = InfoWorker::new(Arc::new(Atlas), 2);
        for country in ["France", "Spain", "Italy"] {
            worker.queue_lookup(country, LookupOrigin::Click);
        }

        assert_eq!(worker.start_next().map(|r| r.country), Some("France".into()));
        assert_eq!(worker.start_next().map(|r| r.country), Some("Spain".into()));
        assert!(worker.start_next().is_none());
        assert_eq!(worker.active_count(), 2);

        worker.active.fetch_sub(1, Ordering::SeqCst);
        assert_eq!(worker.start_next().map(|r| r.country), Some("Italy".into()));
        assert_eq!(worker.pending_count(), 0);
    }

    #[test]
    fn run_passes_request_through() {
        let request = LookupRequest {
            token: Uuid::new_v4(),
            country: "Atlantis".into(),
            origin: LookupOrigin::Search,
        };
        let token = request.token;
        let response = InfoWorker::run(&Atlas, request);
        assert_eq!(response.token, token);
        assert_eq!(response.origin, LookupOrigin::Search);
        assert!(response.info.is_none());

        let response = InfoWorker::run(
            &Atlas,
            LookupRequest {
                token,
                country: "France".into(),
                origin: LookupOrigin::Click,
            },
        );
        assert_eq!(response.info.map(|i| i.code).as_deref(), Some("FR"));
    }
}
