// SPDX-License-Identifier: MPL-2.0
//! Gallery controller: package selection, search and batched thumbnail
//! publishing.
//!
//! The controller owns the session state and runs every disk-bound step on a
//! tokio runtime. Results reach the host as [`GalleryEvent`]s on an unbounded
//! channel; the host applies them in arrival order, for instance through a
//! [`GalleryView`].
//!
//! # Cancellation
//!
//! Each kind of background work carries a generation number. Starting new
//! work bumps the generation and emits [`GalleryEvent::Cleared`] while holding
//! the session lock, and a task publishes only after re-checking its
//! generation under that same lock. Once `Cleared` is on the channel, no event
//! from superseded work can follow it.
//!
//! - `load`: bumped by [`GalleryController::select_package`].
//! - `filter`: bumped by every package switch, search change and load
//!   completion.
//!
//! Superseded tasks are also aborted so they stop decoding early.

pub mod filter;
pub mod view;

pub use filter::{EmptyReason, SearchState};
pub use view::{GalleryView, ViewStatus};

use crate::config::Config;
use crate::directory_scanner::{collect_images, ExcludedPaths, ImageFile};
use crate::media::{SvgScale, Thumbnail, ThumbnailLoader};
use crate::package_discovery::{discover_packages, Package};
use futures_util::future::join_all;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Resolved controller settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GallerySettings {
    /// Subtrees skipped during discovery and scanning.
    pub excluded: ExcludedPaths,
    /// Edge of the square thumbnail box, in pixels.
    pub thumbnail_size: u32,
    /// Thumbnails decoded concurrently and published together.
    pub batch_size: usize,
    /// Quiet period after the last keystroke before filtering.
    pub debounce: Duration,
    pub svg_scale: SvgScale,
}

impl GallerySettings {
    fn thumbnail_loader(&self) -> ThumbnailLoader {
        ThumbnailLoader::new(self.thumbnail_size, self.thumbnail_size)
            .with_svg_scale(self.svg_scale)
    }
}

impl Default for GallerySettings {
    fn default() -> Self {
        Config::default().gallery_settings()
    }
}

/// An image file paired with its thumbnail.
#[derive(Debug, Clone)]
pub struct GalleryItem {
    pub file: ImageFile,
    pub thumbnail: Thumbnail,
}

/// Updates published to the host, in order.
#[derive(Debug, Clone)]
pub enum GalleryEvent {
    /// Remove every displayed item and message.
    Cleared,
    /// A package scan started.
    Loading,
    /// A filter pass started with `matches` results for the normalized query.
    Filtered { query: String, matches: usize },
    /// Append these items, in order.
    ItemsAdded(Vec<GalleryItem>),
    /// The pass produced nothing to show.
    Empty(EmptyReason),
    /// The pass failed; the message replaces the list.
    Error(String),
    /// The pass completed after showing `shown` items.
    Finished { shown: usize },
}

/// Lifecycle of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryPhase {
    /// No package selected.
    Idle,
    /// Scanning a package.
    Loading { package: String },
    /// Publishing thumbnails for a search.
    Filtering { query: String },
    /// The last pass completed.
    Ready { shown: usize },
    /// The scan failed.
    Failed { message: String },
    /// [`GalleryController::dispose`] was called.
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Generation {
    load: u64,
    filter: u64,
}

struct Session {
    package: Option<Package>,
    images: Option<Arc<Vec<ImageFile>>>,
    search: SearchState,
    phase: GalleryPhase,
}

struct Shared {
    load_generation: AtomicU64,
    filter_generation: AtomicU64,
    disposed: AtomicBool,
    session: Mutex<Session>,
    events: mpsc::UnboundedSender<GalleryEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Generation {
        Generation {
            load: self.load_generation.load(Ordering::SeqCst),
            filter: self.filter_generation.load(Ordering::SeqCst),
        }
    }

    fn is_current(&self, generation: Generation) -> bool {
        !self.disposed.load(Ordering::SeqCst) && self.current() == generation
    }

    fn next_filter_generation(&self) -> u64 {
        self.filter_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Must be called with the session lock held.
    fn send(&self, event: GalleryEvent) {
        // The host dropped its receiver; nothing left to notify.
        let _ = self.events.send(event);
    }

    /// Sends `event` and updates the phase if `generation` is still current.
    fn publish(
        &self,
        generation: Generation,
        event: GalleryEvent,
        phase: Option<GalleryPhase>,
    ) -> bool {
        let mut session = self.lock();
        if !self.is_current(generation) {
            return false;
        }
        self.send(event);
        if let Some(phase) = phase {
            session.phase = phase;
        }
        true
    }
}

/// Drives one gallery session.
///
/// Dropping the controller disposes it.
pub struct GalleryController {
    settings: GallerySettings,
    runtime: Handle,
    shared: Arc<Shared>,
    load_task: Option<JoinHandle<()>>,
    filter_task: Option<JoinHandle<()>>,
}

impl GalleryController {
    /// Creates an idle controller that spawns its work on `runtime`.
    ///
    /// Returns the receiving end of the event stream.
    pub fn new(
        settings: GallerySettings,
        runtime: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<GalleryEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            load_generation: AtomicU64::new(0),
            filter_generation: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            session: Mutex::new(Session {
                package: None,
                images: None,
                search: SearchState::default(),
                phase: GalleryPhase::Idle,
            }),
            events,
        });

        let controller = Self {
            settings,
            runtime,
            shared,
            load_task: None,
            filter_task: None,
        };
        (controller, receiver)
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    /// Discovers the packages under `roots`, sorted by name.
    ///
    /// This walks the file system on the calling thread.
    pub fn list_packages<P: AsRef<Path>>(&self, roots: &[P]) -> Vec<Package> {
        discover_packages(roots, &self.settings.excluded)
    }

    pub fn phase(&self) -> GalleryPhase {
        self.shared.lock().phase.clone()
    }

    pub fn search_state(&self) -> SearchState {
        self.shared.lock().search.clone()
    }

    pub fn selected_package(&self) -> Option<Package> {
        self.shared.lock().package.clone()
    }

    /// Makes `package` current and starts scanning it.
    ///
    /// Any load or filter still running for the previous package is
    /// cancelled. The search state is kept.
    pub fn select_package(&mut self, package: Package) {
        if self.is_disposed() {
            return;
        }
        abort(&mut self.load_task);
        abort(&mut self.filter_task);

        let load_generation = {
            let mut session = self.shared.lock();
            let load_generation = self.shared.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.shared.next_filter_generation();

            session.phase = GalleryPhase::Loading {
                package: package.name.clone(),
            };
            session.package = Some(package.clone());
            session.images = None;

            self.shared.send(GalleryEvent::Cleared);
            self.shared.send(GalleryEvent::Loading);
            load_generation
        };

        tracing::info!(package = %package.name, "loading package images");

        let task = load_package(
            Arc::clone(&self.shared),
            self.settings.clone(),
            package,
            load_generation,
        );
        self.load_task = Some(self.runtime.spawn(task));
    }

    /// Updates the search text and schedules a debounced filter pass.
    ///
    /// A pending pass from an earlier keystroke is cancelled and the quiet
    /// period restarts.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        let debounce = self.settings.debounce;
        self.schedule_filter(move |search| search.query = query, Some(debounce));
    }

    /// Toggles the bundled-only filter and filters immediately.
    pub fn set_bundled_only(&mut self, bundled_only: bool) {
        self.schedule_filter(move |search| search.bundled_only = bundled_only, None);
    }

    /// Cancels all work and stops publishing.
    ///
    /// Emits a final [`GalleryEvent::Cleared`]. Calling it twice is a no-op.
    pub fn dispose(&mut self) {
        if self.shared.disposed.load(Ordering::SeqCst) {
            return;
        }
        abort(&mut self.load_task);
        abort(&mut self.filter_task);

        let mut session = self.shared.lock();
        self.shared.load_generation.fetch_add(1, Ordering::SeqCst);
        self.shared.next_filter_generation();
        self.shared.disposed.store(true, Ordering::SeqCst);
        session.images = None;
        session.phase = GalleryPhase::Disposed;
        self.shared.send(GalleryEvent::Cleared);
        tracing::debug!("gallery disposed");
    }

    fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::SeqCst)
    }

    fn schedule_filter<F>(&mut self, update: F, delay: Option<Duration>)
    where
        F: FnOnce(&mut SearchState),
    {
        if self.is_disposed() {
            return;
        }
        abort(&mut self.filter_task);

        let generation = {
            let mut session = self.shared.lock();
            update(&mut session.search);
            Generation {
                load: self.shared.load_generation.load(Ordering::SeqCst),
                filter: self.shared.next_filter_generation(),
            }
        };

        let shared = Arc::clone(&self.shared);
        let settings = self.settings.clone();
        self.filter_task = Some(self.runtime.spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            run_filter(shared, settings, generation).await;
        }));
    }
}

impl Drop for GalleryController {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn abort(task: &mut Option<JoinHandle<()>>) {
    if let Some(task) = task.take() {
        task.abort();
    }
}

/// Everything a filter pass needs, captured under the session lock.
struct RenderPass {
    generation: Generation,
    images: Arc<Vec<ImageFile>>,
    search: SearchState,
    package: Package,
}

async fn load_package(
    shared: Arc<Shared>,
    settings: GallerySettings,
    package: Package,
    load_generation: u64,
) {
    let directory = package.directory.clone();
    let excluded = settings.excluded.clone();
    let scanned =
        tokio::task::spawn_blocking(move || collect_images(&directory, &excluded)).await;

    let pass = {
        let mut session = shared.lock();
        if shared.disposed.load(Ordering::SeqCst)
            || shared.load_generation.load(Ordering::SeqCst) != load_generation
        {
            tracing::debug!(package = %package.name, "discarding superseded scan");
            return;
        }

        let images = match scanned {
            Ok(images) => Arc::new(images),
            Err(err) => {
                let message = format!("Error loading images: {err}");
                tracing::error!(package = %package.name, error = %err, "package scan failed");
                shared.next_filter_generation();
                shared.send(GalleryEvent::Cleared);
                shared.send(GalleryEvent::Error(message.clone()));
                session.phase = GalleryPhase::Failed { message };
                return;
            }
        };

        tracing::info!(package = %package.name, count = images.len(), "scanned package");
        session.images = Some(Arc::clone(&images));

        RenderPass {
            generation: Generation {
                load: load_generation,
                filter: shared.next_filter_generation(),
            },
            images,
            search: session.search.clone(),
            package,
        }
    };

    render(&shared, &settings, pass).await;
}

async fn run_filter(shared: Arc<Shared>, settings: GallerySettings, generation: Generation) {
    let pass = {
        let mut session = shared.lock();
        if !shared.is_current(generation) {
            return;
        }
        // A scan in flight picks up the latest search when it completes.
        let (Some(images), Some(package)) = (&session.images, &session.package) else {
            return;
        };

        let pass = RenderPass {
            generation,
            images: Arc::clone(images),
            search: session.search.clone(),
            package: package.clone(),
        };
        session.phase = GalleryPhase::Filtering {
            query: pass.search.normalized_query(),
        };
        pass
    };

    render(&shared, &settings, pass).await;
}

/// Clears the view, filters the cached list and publishes thumbnails in
/// batches until done or superseded.
async fn render(shared: &Shared, settings: &GallerySettings, pass: RenderPass) {
    let RenderPass {
        generation,
        images,
        search,
        package,
    } = pass;

    let filtered = search.apply(&images, &package.bundled_assets);
    let query = search.normalized_query();
    tracing::debug!(query = %query, matches = filtered.len(), "filtering images");

    if !shared.publish(generation, GalleryEvent::Cleared, None) {
        return;
    }
    if !shared.publish(
        generation,
        GalleryEvent::Filtered {
            query,
            matches: filtered.len(),
        },
        None,
    ) {
        return;
    }

    if filtered.is_empty() {
        if shared.publish(generation, GalleryEvent::Empty(search.empty_reason()), None) {
            shared.publish(
                generation,
                GalleryEvent::Finished { shown: 0 },
                Some(GalleryPhase::Ready { shown: 0 }),
            );
        }
        return;
    }

    let loader = settings.thumbnail_loader();
    let mut shown = 0;
    for batch in filtered.chunks(settings.batch_size.max(1)) {
        if !shared.is_current(generation) {
            tracing::debug!(shown, "filter pass superseded");
            return;
        }

        let tasks = batch.iter().cloned().map(|file| {
            tokio::task::spawn_blocking(move || {
                let thumbnail = loader.load(&file.path);
                GalleryItem { file, thumbnail }
            })
        });

        let mut items = Vec::with_capacity(batch.len());
        for result in join_all(tasks).await {
            match result {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::error!(error = %err, "thumbnail task failed");
                    let message = format!("Error filtering images: {err}");
                    shared.publish(
                        generation,
                        GalleryEvent::Error(message.clone()),
                        Some(GalleryPhase::Failed { message }),
                    );
                    return;
                }
            }
        }

        shown += items.len();
        if !shared.publish(generation, GalleryEvent::ItemsAdded(items), None) {
            return;
        }
    }

    shared.publish(
        generation,
        GalleryEvent::Finished { shown },
        Some(GalleryPhase::Ready { shown }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::AssetManifest;
    use image_rs::{Rgba, RgbaImage};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(10);

    fn settings() -> GallerySettings {
        GallerySettings {
            batch_size: 2,
            debounce: Duration::from_millis(50),
            ..GallerySettings::default()
        }
    }

    fn write_png(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]))
            .save(path)
            .expect("failed to write png");
    }

    fn package(root: &TempDir, name: &str, files: &[&str], assets: &[&str]) -> Package {
        let directory: PathBuf = root.path().join(name);
        fs::create_dir_all(&directory).expect("failed to create package dir");
        for file in files {
            write_png(&directory.join(file));
        }
        Package {
            name: name.to_string(),
            manifest_file: directory.join("pubspec.yaml"),
            directory,
            bundled_assets: AssetManifest::new(assets.iter().map(|a| a.to_string()).collect()),
        }
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<GalleryEvent>) -> GalleryEvent {
        timeout(WAIT, events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    /// Applies events to a view until a pass finishes.
    async fn settle(events: &mut mpsc::UnboundedReceiver<GalleryEvent>, view: &mut GalleryView) {
        loop {
            let event = next_event(events).await;
            let finished = matches!(event, GalleryEvent::Finished { .. } | GalleryEvent::Error(_));
            view.apply(event);
            if finished {
                return;
            }
        }
    }

    fn shown_names(view: &GalleryView) -> Vec<String> {
        view.items()
            .iter()
            .map(|item| item.file.relative_path.clone())
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn selecting_package_publishes_sorted_items_in_batches() {
        let root = tempdir().expect("failed to create temp dir");
        let app = package(&root, "app", &["c.png", "a.png", "sub/b.png"], &[]);
        let (mut controller, mut events) = GalleryController::new(settings(), Handle::current());

        controller.select_package(app);

        assert!(matches!(next_event(&mut events).await, GalleryEvent::Cleared));
        assert!(matches!(next_event(&mut events).await, GalleryEvent::Loading));

        let mut batches = Vec::new();
        loop {
            match next_event(&mut events).await {
                GalleryEvent::ItemsAdded(items) => batches.push(items.len()),
                GalleryEvent::Finished { shown } => {
                    assert_eq!(shown, 3);
                    break;
                }
                GalleryEvent::Error(message) => panic!("unexpected error: {message}"),
                _ => {}
            }
        }

        assert_eq!(batches, vec![2, 1]);
        assert_eq!(controller.phase(), GalleryPhase::Ready { shown: 3 });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn switching_packages_shows_only_the_latest_package() {
        let root = tempdir().expect("failed to create temp dir");
        let first = package(&root, "first", &["a1.png", "a2.png", "a3.png", "a4.png"], &[]);
        let second = package(&root, "second", &["b1.png"], &[]);
        let (mut controller, mut events) = GalleryController::new(settings(), Handle::current());
        let mut view = GalleryView::default();

        controller.select_package(first);
        controller.select_package(second);
        settle(&mut events, &mut view).await;

        assert_eq!(shown_names(&view), vec!["b1.png"]);
        assert_eq!(
            controller.selected_package().map(|p| p.name),
            Some("second".to_string())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rapid_keystrokes_filter_once_with_the_last_query() {
        let root = tempdir().expect("failed to create temp dir");
        let app = package(&root, "app", &["cat.png", "category.png", "dog.png"], &[]);
        let (mut controller, mut events) = GalleryController::new(settings(), Handle::current());
        let mut view = GalleryView::default();

        controller.select_package(app);
        settle(&mut events, &mut view).await;

        controller.set_search_query("cat");
        controller.set_search_query("cate");

        let mut queries = Vec::new();
        loop {
            let event = next_event(&mut events).await;
            if let GalleryEvent::Filtered { query, .. } = &event {
                queries.push(query.clone());
            }
            let finished = matches!(event, GalleryEvent::Finished { .. });
            view.apply(event);
            if finished {
                break;
            }
        }

        assert_eq!(queries, vec!["cate".to_string()]);
        assert_eq!(shown_names(&view), vec!["category.png"]);
        assert_eq!(controller.search_state().query, "cate");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn bundled_only_filters_against_manifest() {
        let root = tempdir().expect("failed to create temp dir");
        let app = package(
            &root,
            "app",
            &["assets/icons/add.png", "assets/raw/skip.png", "test/golden.png"],
            &["assets/icons/"],
        );
        let (mut controller, mut events) = GalleryController::new(settings(), Handle::current());
        let mut view = GalleryView::default();

        controller.select_package(app);
        settle(&mut events, &mut view).await;
        assert_eq!(view.items().len(), 3);

        controller.set_bundled_only(true);
        settle(&mut events, &mut view).await;

        assert_eq!(shown_names(&view), vec!["assets/icons/add.png"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn empty_results_report_a_reason() {
        let root = tempdir().expect("failed to create temp dir");
        let bare = package(&root, "bare", &[], &[]);
        let app = package(&root, "app", &["one.png"], &[]);
        let (mut controller, mut events) = GalleryController::new(settings(), Handle::current());
        let mut view = GalleryView::default();

        controller.select_package(bare);
        settle(&mut events, &mut view).await;
        assert_eq!(view.status(), &ViewStatus::Empty(EmptyReason::NoImages));

        controller.select_package(app);
        settle(&mut events, &mut view).await;
        controller.set_bundled_only(true);
        settle(&mut events, &mut view).await;
        assert_eq!(view.status(), &ViewStatus::Empty(EmptyReason::NoBundledImages));

        controller.set_search_query("zebra");
        settle(&mut events, &mut view).await;
        assert_eq!(view.status(), &ViewStatus::Empty(EmptyReason::NoMatches));
        assert_eq!(view.message(), Some("No matching images found"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn search_set_while_loading_applies_on_completion() {
        let root = tempdir().expect("failed to create temp dir");
        let app = package(&root, "app", &["keep_me.png", "other.png"], &[]);
        let (mut controller, mut events) = GalleryController::new(
            GallerySettings {
                debounce: Duration::ZERO,
                ..settings()
            },
            Handle::current(),
        );
        let mut view = GalleryView::default();

        controller.set_search_query("keep");
        controller.select_package(app);
        settle(&mut events, &mut view).await;

        assert_eq!(shown_names(&view), vec!["keep_me.png"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn corrupt_files_become_placeholders() {
        let root = tempdir().expect("failed to create temp dir");
        let app = package(&root, "app", &["good.png"], &[]);
        fs::write(app.directory.join("bad.png"), b"not an image").expect("write file");
        let (mut controller, mut events) = GalleryController::new(settings(), Handle::current());
        let mut view = GalleryView::default();

        controller.select_package(app);
        settle(&mut events, &mut view).await;

        let placeholders: Vec<bool> = view
            .items()
            .iter()
            .map(|item| item.thumbnail.is_placeholder())
            .collect();
        assert_eq!(placeholders, vec![true, false]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dispose_stops_publishing() {
        let root = tempdir().expect("failed to create temp dir");
        let app = package(&root, "app", &["a.png", "b.png", "c.png"], &[]);
        let (mut controller, mut events) = GalleryController::new(settings(), Handle::current());

        controller.select_package(app.clone());
        controller.dispose();
        controller.select_package(app);
        controller.set_search_query("a");

        let mut received = Vec::new();
        while let Ok(Some(event)) = timeout(Duration::from_millis(300), events.recv()).await {
            received.push(event);
        }

        assert!(matches!(received.last(), Some(GalleryEvent::Cleared)));
        assert!(!received
            .iter()
            .any(|event| matches!(event, GalleryEvent::ItemsAdded(_))));
        assert_eq!(controller.phase(), GalleryPhase::Disposed);
    }

    #[test]
    fn list_packages_uses_configured_exclusions() {
        let root = tempdir().expect("failed to create temp dir");
        fs::create_dir_all(root.path().join("app/build")).expect("create dirs");
        fs::write(root.path().join("app/pubspec.yaml"), "name: app\n").expect("write");
        fs::write(root.path().join("app/build/pubspec.yaml"), "name: built\n").expect("write");

        let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
        let (controller, _events) =
            GalleryController::new(GallerySettings::default(), runtime.handle().clone());

        let names: Vec<String> = controller
            .list_packages(&[root.path()])
            .into_iter()
            .map(|package| package.name)
            .collect();
        assert_eq!(names, vec!["app".to_string()]);
        assert_eq!(controller.phase(), GalleryPhase::Idle);
        assert_eq!(controller.settings(), &GallerySettings::default());
        assert!(controller.settings().excluded.is_excluded("/app/build/"));
    }
}
