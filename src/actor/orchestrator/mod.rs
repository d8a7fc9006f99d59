//! The auto-tiling orchestrator.
//!
//! One actor task owns every `MonitorTilingState` and serializes all
//! mutation. Window-server notifications, monitor changes, and imperative
//! commands arrive on the same channel; bursts are coalesced by a
//! trailing-edge debounce, and each recomputation goes out as a single
//! positioning batch. Geometry the user changed by hand (moves, resizes)
//! is observed and deliberately left alone.


use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, trace, warn};

use crate::actor::{self, Receiver, Sender};
use crate::common::collections::{BTreeMap, HashMap};
use crate::common::config::Settings;
use crate::layout_engine::{
    self as layout, CycleDirection, Direction, LayoutInput, Orientation, WindowLayoutInfo,
};
use crate::model::container::ContainerId;
use crate::model::layout::LayoutId;
use crate::model::monitor::MonitorTilingState;
use crate::model::persist::StateStore;
use crate::sys::geometry::Rect;
use crate::sys::screen::{MonitorId, MonitorSource};
use crate::sys::window_server::{
    BatchResult, WindowId, WindowPlacement, WindowPositioner, WindowServerEvent, WindowSource,
};

#[derive(Debug)]
pub enum Event {
    /// Begin tiling: snapshot the world and perform the first tile.
    Start,
    /// Stop tiling: cancel pending work and persist state.
    Stop,
    /// End the actor task entirely (stops first).
    Shutdown,
    WindowServer(WindowServerEvent),
    MonitorsChanged,
    Command(Command),
    /// The debounce timer elapsed.
    RetileNow,
    Query(QueryRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SwitchLayout {
        layout: LayoutId,
        monitor: Option<MonitorId>,
    },
    CycleWindow(CycleDirection),
    MoveWindowToContainer(Direction),
    FocusContainer(Direction),
    ToggleOrientation,
}

/// Outcome of one retile pass, kept for observability; never thrown.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileResult {
    Success(usize),
    NoWindowsToTile,
    Failed(String),
}

#[derive(Debug)]
pub enum QueryRequest {
    LastResult(oneshot::Sender<Option<TileResult>>),
    Snapshot(oneshot::Sender<Vec<MonitorSnapshot>>),
}

/// Read-only view of one monitor's tiling, for queries and the replay CLI.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonitorSnapshot {
    pub monitor_id: MonitorId,
    pub active_layout: LayoutId,
    pub containers: Vec<ContainerSnapshot>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ContainerSnapshot {
    pub id: ContainerId,
    pub frame: Rect,
    pub windows: Vec<WindowId>,
    pub focused: Option<WindowId>,
    pub orientation: Orientation,
}

#[derive(Clone)]
pub struct OrchestratorHandle {
    tx: Sender<Event>,
}

impl OrchestratorHandle {
    pub fn send(&self, event: Event) { self.tx.send(event) }

    pub fn start(&self) { self.tx.send(Event::Start) }

    pub fn stop(&self) { self.tx.send(Event::Stop) }

    pub fn shutdown(&self) { self.tx.send(Event::Shutdown) }

    pub fn notify_window_event(&self, event: WindowServerEvent) {
        self.tx.send(Event::WindowServer(event))
    }

    pub fn notify_monitors_changed(&self) { self.tx.send(Event::MonitorsChanged) }

    pub fn switch_layout(&self, layout: LayoutId, monitor: Option<MonitorId>) {
        self.tx.send(Event::Command(Command::SwitchLayout { layout, monitor }))
    }

    pub fn cycle_window(&self, direction: CycleDirection) {
        self.tx.send(Event::Command(Command::CycleWindow(direction)))
    }

    pub fn move_window_to_container(&self, direction: Direction) {
        self.tx.send(Event::Command(Command::MoveWindowToContainer(direction)))
    }

    pub fn focus_container(&self, direction: Direction) {
        self.tx.send(Event::Command(Command::FocusContainer(direction)))
    }

    pub fn toggle_orientation(&self) {
        self.tx.send(Event::Command(Command::ToggleOrientation))
    }

    pub async fn last_result(&self) -> Option<TileResult> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(Event::Query(QueryRequest::LastResult(tx)));
        rx.await.unwrap_or(None)
    }

    /// Also serves as a barrier: the reply proves every earlier event on
    /// the channel has been processed.
    pub async fn snapshot(&self) -> Vec<MonitorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(Event::Query(QueryRequest::Snapshot(tx)));
        rx.await.unwrap_or_default()
    }
}

struct PendingTask {
    token: CancellationToken,
    _task: JoinHandle<()>,
}

struct InflightBatch {
    token: CancellationToken,
    task: JoinHandle<BatchResult>,
}

type ContainerSignature = (Vec<WindowId>, Option<WindowId>);

pub struct AutoTilingOrchestrator {
    settings: Settings,
    window_source: Arc<dyn WindowSource>,
    monitor_source: Arc<dyn MonitorSource>,
    positioner: Arc<dyn WindowPositioner>,
    store: Arc<dyn StateStore>,
    events_tx: Sender<Event>,

    monitors: BTreeMap<MonitorId, MonitorTilingState>,
    running: bool,
    /// The window the orchestrator already considers focused; duplicate
    /// focus notifications for it are suppressed before any scheduling.
    last_focused: Option<WindowId>,
    pending_retile: Option<PendingTask>,
    inflight_batch: Option<InflightBatch>,
    /// End of the z-order suppression window opened by the last retile.
    z_guard_until: Option<Instant>,
    /// Container membership/focus as of the last retile, for deciding
    /// which containers a raise pass may touch.
    last_signatures: HashMap<(MonitorId, ContainerId), ContainerSignature>,
    last_result: Option<TileResult>,
}

impl AutoTilingOrchestrator {
    pub fn spawn(
        settings: Settings,
        window_source: Arc<dyn WindowSource>,
        monitor_source: Arc<dyn MonitorSource>,
        positioner: Arc<dyn WindowPositioner>,
        store: Arc<dyn StateStore>,
    ) -> OrchestratorHandle {
        let (events_tx, events) = actor::channel();
        let orchestrator = AutoTilingOrchestrator::new(
            settings,
            window_source,
            monitor_source,
            positioner,
            store,
            events_tx.clone(),
        );
        tokio::spawn(orchestrator.run(events));
        OrchestratorHandle { tx: events_tx }
    }

    fn new(
        settings: Settings,
        window_source: Arc<dyn WindowSource>,
        monitor_source: Arc<dyn MonitorSource>,
        positioner: Arc<dyn WindowPositioner>,
        store: Arc<dyn StateStore>,
        events_tx: Sender<Event>,
    ) -> AutoTilingOrchestrator {
        AutoTilingOrchestrator {
            settings,
            window_source,
            monitor_source,
            positioner,
            store,
            events_tx,
            monitors: BTreeMap::new(),
            running: false,
            last_focused: None,
            pending_retile: None,
            inflight_batch: None,
            z_guard_until: None,
            last_signatures: HashMap::default(),
            last_result: None,
        }
    }

    async fn run(mut self, mut events: Receiver<Event>) {
        while let Some((span, event)) = events.recv().await {
            let shutdown = matches!(event, Event::Shutdown);
            self.handle_event(event).instrument(span).await;
            if shutdown {
                break;
            }
        }
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start => self.start().await,
            Event::Stop | Event::Shutdown => self.stop(),
            Event::Query(request) => self.handle_query(request),
            _ if !self.running => trace!(?event, "not running; event dropped"),
            Event::WindowServer(event) => self.handle_window_event(event),
            Event::MonitorsChanged => self.handle_monitors_changed(),
            Event::Command(command) => self.handle_command(command),
            Event::RetileNow => {
                self.pending_retile = None;
                self.perform_tile(true).await;
            }
        }
    }

    fn handle_query(&self, request: QueryRequest) {
        match request {
            QueryRequest::LastResult(reply) => _ = reply.send(self.last_result.clone()),
            QueryRequest::Snapshot(reply) => {
                let snapshots = self
                    .monitors
                    .values()
                    .map(|state| MonitorSnapshot {
                        monitor_id: state.monitor_id,
                        active_layout: state.active_layout,
                        containers: state
                            .containers()
                            .iter()
                            .map(|c| ContainerSnapshot {
                                id: c.id,
                                frame: c.frame,
                                windows: c.windows().to_vec(),
                                focused: c.focused_window(),
                                orientation: c.orientation,
                            })
                            .collect(),
                    })
                    .collect();
                _ = reply.send(snapshots);
            }
        }
    }

    async fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_focused = self.window_source.focused_window().map(|f| f.id);
        info!("auto tiling started");
        let result = self.perform_tile(self.settings.animate_first_tile).await;
        debug!(?result, "initial tile");
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(pending) = self.pending_retile.take() {
            pending.token.cancel();
        }
        if let Some(batch) = self.inflight_batch.take() {
            batch.token.cancel();
        }
        for (id, state) in &self.monitors {
            self.store.save(*id, &state.to_record());
        }
        info!("auto tiling stopped");
    }

    fn handle_window_event(&mut self, event: WindowServerEvent) {
        match event {
            WindowServerEvent::Opened(info) => {
                if info.is_floating {
                    trace!(window = %info.id, "floating window opened; not tiled");
                    return;
                }
                debug!(window = %info.id, app = %info.app_name, "window opened");
                self.schedule_retile();
            }
            WindowServerEvent::Closed(id) => {
                debug!(window = %id, "window closed");
                if self.last_focused == Some(id) {
                    self.last_focused = None;
                }
                self.schedule_retile();
            }
            WindowServerEvent::Focused(id) => self.handle_focus(id),
            WindowServerEvent::Moved(id, _) | WindowServerEvent::Resized(id, _) => {
                // User-initiated geometry; fighting it would cause flicker.
                trace!(window = %id, "ignoring user geometry change");
            }
        }
    }

    fn handle_focus(&mut self, id: WindowId) {
        if self.last_focused == Some(id) {
            trace!(window = %id, "duplicate focus event suppressed");
            return;
        }
        self.last_focused = Some(id);

        let resizable = self
            .window_source
            .visible_windows()
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.is_resizable)
            .unwrap_or(true);

        let mut guard_raise: Option<Vec<WindowId>> = None;
        if let Some(state) = self.monitors.values_mut().find(|s| s.contains_window(id)) {
            if resizable {
                // A non-resizable window taking focus leaves the ring focus
                // frozen; the engine draws it centered instead.
                state.focus_window_in_container(id);
            }
            state.update_focused_container(id);

            if let Some(container) = state.container_for_window(id) {
                guard_raise = Some(raise_order(container.windows(), Some(id)));
            }
        }

        // Inside the guard window only the focused container may re-raise;
        // outside it the retile's own raise pass covers the change.
        if self.z_guard_until.is_some_and(|until| Instant::now() < until) {
            if let Some(order) = guard_raise {
                self.positioner.raise_windows(&order);
            }
        }
        self.schedule_retile();
    }

    fn handle_monitors_changed(&mut self) {
        let connected: Vec<MonitorId> =
            self.monitor_source.connected_monitors().iter().map(|m| m.id).collect();
        let disconnected: Vec<MonitorId> =
            self.monitors.keys().copied().filter(|id| !connected.contains(id)).collect();
        for id in disconnected {
            if let Some(state) = self.monitors.remove(&id) {
                info!(monitor = %id, "monitor disconnected; state persisted");
                self.store.save(id, &state.to_record());
            }
        }
        self.schedule_retile();
    }

    fn handle_command(&mut self, command: Command) {
        let Some(focus) = self.resolve_effective_focus() else {
            debug!(?command, "no resolvable focused window; command ignored");
            return;
        };
        match command {
            Command::SwitchLayout { layout, monitor } => {
                let Some(monitor) = monitor.or_else(|| self.monitor_of_window(focus)) else {
                    return;
                };
                let Some(info) =
                    self.monitor_source.connected_monitors().into_iter().find(|m| m.id == monitor)
                else {
                    return;
                };
                let Some(frames) = layout.container_frames(
                    info.visible_frame,
                    self.settings.margin,
                    self.settings.padding,
                ) else {
                    return;
                };
                if let Some(state) = self.monitors.get_mut(&monitor) {
                    state.switch_layout(layout, &frames, None);
                }
            }
            Command::CycleWindow(direction) => {
                if let Some(state) = self.state_of_window_mut(focus) {
                    state.cycle_window(direction, focus);
                }
            }
            Command::MoveWindowToContainer(direction) => {
                if let Some(state) = self.state_of_window_mut(focus) {
                    state.move_window(focus, direction);
                }
            }
            Command::FocusContainer(direction) => {
                if let Some(state) = self.state_of_window_mut(focus) {
                    state.set_focused_container(direction);
                }
            }
            Command::ToggleOrientation => {
                if let Some(state) = self.state_of_window_mut(focus) {
                    if let Some(container) = state.focused_container() {
                        let (id, orientation) = (container.id, container.orientation);
                        let flipped = match orientation {
                            Orientation::Horizontal => Orientation::Vertical,
                            Orientation::Vertical => Orientation::Horizontal,
                        };
                        state.set_container_orientation(id, flipped);
                    }
                }
            }
        }
        self.schedule_retile();
    }

    /// The window commands operate on. The OS focus wins while it names a
    /// tiled window; otherwise fall back to the last known focus, then to
    /// ring bookkeeping, so a hidden or closed focus never bricks commands.
    fn resolve_effective_focus(&self) -> Option<WindowId> {
        if let Some(focus) = self.window_source.focused_window() {
            if self.monitor_of_window(focus.id).is_some() {
                return Some(focus.id);
            }
        }
        if let Some(last) = self.last_focused {
            if self.monitor_of_window(last).is_some() {
                return Some(last);
            }
        }
        for state in self.monitors.values() {
            if let Some(id) = state.focused_container().and_then(|c| c.focused_window()) {
                return Some(id);
            }
            if let Some(id) = state.all_windows().first().copied() {
                return Some(id);
            }
        }
        None
    }

    fn monitor_of_window(&self, id: WindowId) -> Option<MonitorId> {
        self.monitors
            .values()
            .find(|state| state.contains_window(id))
            .map(|state| state.monitor_id)
    }

    fn state_of_window_mut(&mut self, id: WindowId) -> Option<&mut MonitorTilingState> {
        self.monitors.values_mut().find(|state| state.contains_window(id))
    }

    /// Trailing-edge debounce: scheduling always cancels the previously
    /// armed timer, so at most one retile is ever pending.
    fn schedule_retile(&mut self) {
        if let Some(pending) = self.pending_retile.take() {
            pending.token.cancel();
        }
        let token = CancellationToken::new();
        let child = token.clone();
        let tx = self.events_tx.clone();
        let delay = self.settings.debounce_delay();
        let task = tokio::spawn(async move {
            tokio::select! {
                () = child.cancelled() => {}
                () = tokio::time::sleep(delay) => tx.send(Event::RetileNow),
            }
        });
        self.pending_retile = Some(PendingTask { token, _task: task });
    }

    /// Recomputes and repositions everything. One batch per pass; batches
    /// never overlap.
    async fn perform_tile(&mut self, animated: bool) -> TileResult {
        let windows = self.window_source.visible_windows();
        let monitor_infos = self.monitor_source.connected_monitors();
        let os_focus = self.window_source.focused_window().map(|f| f.id);

        let tileable: Vec<_> = windows.iter().filter(|w| !w.is_floating).collect();
        if !tileable.is_empty() && monitor_infos.is_empty() {
            let result = TileResult::Failed("windows present but no monitors connected".into());
            warn!(?result, "retile failed");
            self.last_result = Some(result.clone());
            return result;
        }

        // Partition by window center; anything off every monitor falls back
        // to the main one.
        let mut by_monitor: HashMap<MonitorId, Vec<WindowId>> = HashMap::default();
        if let Some(main) = monitor_infos.iter().find(|m| m.is_main).or(monitor_infos.first()) {
            for window in &tileable {
                let target = monitor_infos
                    .iter()
                    .find(|m| m.frame.contains(window.frame.center()))
                    .map(|m| m.id)
                    .unwrap_or(main.id);
                by_monitor.entry(target).or_default().push(window.id);
            }
        }

        // Drop windows that closed or drifted to another monitor. Existing
        // relative order is never reshuffled.
        for state in self.monitors.values_mut() {
            let assigned = by_monitor.get(&state.monitor_id);
            for id in state.all_windows() {
                if !assigned.is_some_and(|ids| ids.contains(&id)) {
                    state.remove_window(id);
                }
            }
        }

        let margin = self.settings.margin;
        let padding = self.settings.padding;
        let offset = self.settings.accordion_offset;

        let mut placements: Vec<WindowPlacement> = Vec::new();
        for info in &monitor_infos {
            let Some(monitor_windows) = by_monitor.get(&info.id) else {
                continue;
            };
            let state = self.ensure_state(info.id);

            // Rebuild the container shape first so restored layout memory
            // has slots to aim at.
            if let Some(frames) =
                state.active_layout.container_frames(info.visible_frame, margin, padding)
            {
                state.apply_container_frames(&frames);
            }

            // New windows append; the first window on a monitor seeds the
            // monocle container.
            for &id in monitor_windows {
                if !state.contains_window(id) {
                    let remembered = state.remembered_container_for(id);
                    state.assign_window(id, remembered);
                }
            }

            if let Some(focus) = os_focus {
                if state.contains_window(focus) {
                    let focus_resizable = windows
                        .iter()
                        .find(|w| w.id == focus)
                        .is_some_and(|w| w.is_resizable);
                    if focus_resizable {
                        state.focus_window_in_container(focus);
                    }
                    state.update_focused_container(focus);
                }
            }

            for container in state.containers() {
                if container.is_empty() {
                    continue;
                }
                let input = LayoutInput {
                    windows: container
                        .windows()
                        .iter()
                        .filter_map(|id| windows.iter().find(|w| w.id == *id))
                        .map(|w| WindowLayoutInfo {
                            id: w.id,
                            owner_pid: w.owner_pid,
                            frame: w.frame,
                            is_resizable: w.is_resizable,
                            is_floating: w.is_floating,
                        })
                        .collect(),
                    ring_focus: container.focused_window(),
                    actual_focus: os_focus,
                    container_frame: container.frame,
                    offset,
                    orientation: container.orientation,
                };
                placements.extend(layout::calculate(&input).placements);
            }
        }

        let result = if tileable.is_empty() {
            TileResult::NoWindowsToTile
        } else {
            TileResult::Success(placements.len())
        };

        self.dispatch_batch(placements, animated).await;
        self.raise_changed_containers(os_focus);
        self.z_guard_until = Some(Instant::now() + self.settings.z_order_guard());

        debug!(?result, "retile complete");
        self.last_result = Some(result.clone());
        result
    }

    fn ensure_state(&mut self, monitor: MonitorId) -> &mut MonitorTilingState {
        let store = Arc::clone(&self.store);
        self.monitors.entry(monitor).or_insert_with(|| match store.load(monitor) {
            Some(record) => {
                info!(%monitor, "restoring persisted tiling state");
                MonitorTilingState::from_record(monitor, &record)
            }
            None => MonitorTilingState::new(monitor),
        })
    }

    /// Cancels and awaits the in-flight batch first. Instant batches apply
    /// inline; animated ones run on their own cancellable task.
    async fn dispatch_batch(&mut self, placements: Vec<WindowPlacement>, animated: bool) {
        if let Some(batch) = self.inflight_batch.take() {
            batch.token.cancel();
            match batch.task.await {
                Ok(BatchResult::Failed(reason)) => {
                    warn!(%reason, "previous positioning batch failed")
                }
                Ok(_) => {}
                Err(err) => warn!(%err, "previous positioning batch panicked"),
            }
        }
        if placements.is_empty() {
            return;
        }
        let duration = if animated {
            self.settings.animation_duration()
        } else {
            Duration::ZERO
        };
        if duration.is_zero() {
            // Instant positioning happens inline; there is nothing to
            // cancel and nothing for a later batch to overlap with.
            if let BatchResult::Failed(reason) =
                self.positioner.animate_batch(&placements, duration)
            {
                warn!(%reason, "positioning batch failed");
            }
            return;
        }
        let token = CancellationToken::new();
        let child = token.clone();
        let positioner = Arc::clone(&self.positioner);
        let task = tokio::spawn(async move {
            if child.is_cancelled() {
                return BatchResult::Cancelled;
            }
            let result = positioner.animate_batch(&placements, duration);
            if let BatchResult::Failed(reason) = &result {
                warn!(%reason, "positioning batch failed");
            }
            result
        });
        self.inflight_batch = Some(InflightBatch { token, task });
    }

    /// Raises only containers whose membership or ring focus changed since
    /// the last pass; unrelated containers are never included. The batch
    /// holding the actually focused window is sent last, with that window
    /// last inside it.
    fn raise_changed_containers(&mut self, os_focus: Option<WindowId>) {
        let mut signatures: HashMap<(MonitorId, ContainerId), ContainerSignature> =
            HashMap::default();
        let mut batches: Vec<Vec<WindowId>> = Vec::new();
        for state in self.monitors.values() {
            for container in state.containers() {
                let key = (state.monitor_id, container.id);
                let signature = (container.windows().to_vec(), container.focused_window());
                let changed = self.last_signatures.get(&key) != Some(&signature);
                signatures.insert(key, signature);
                if changed && !container.is_empty() {
                    batches.push(raise_order(container.windows(), os_focus));
                }
            }
        }
        self.last_signatures = signatures;
        batches.sort_by_key(|batch| os_focus.is_some_and(|id| batch.contains(&id)));
        for batch in batches {
            self.positioner.raise_windows(&batch);
        }
    }
}

/// Ring order with the focused window (when present) moved to the end, so
/// it is raised last and lands on top.
fn raise_order(windows: &[WindowId], focused: Option<WindowId>) -> Vec<WindowId> {
    let mut order: Vec<WindowId> = windows.to_vec();
    if let Some(id) = focused {
        if let Some(index) = order.iter().position(|&w| w == id) {
            order.remove(index);
            order.push(id);
        }
    }
    order
}
