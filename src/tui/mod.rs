//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates terminal events into `core::Action` values and performs the
//! `Effect`s the controller asks for.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//!   crossterm events ─► router ─┐
//!   channel task ───────────────┼─► Action ─► controller.update ─► Effects
//!   REST tasks ─────────────────┘                                    │
//!       ▲                                                            │
//!       └──────────── spawn fetch / create / reload ◄────────────────┘
//! ```
//!
//! Background work reports back over a std `mpsc` channel drained once per
//! iteration. The loop polls for terminal input at most [`TICK_INTERVAL`]
//! and sends `Action::Tick` every iteration so controller deadlines fire.
//!
//! ## Reload
//!
//! After a room is created the controller asks for a reload. The runtime
//! fetches the room list again, rebuilds the controller on a fresh state and
//! opens a new channel, keeping the local user and notification choice.

mod component;
pub mod components;
pub mod event;
pub mod notify;
pub mod router;
pub mod ui;

use std::io::{self, stdout};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
    EnableFocusChange, EnableMouseCapture, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::task::AbortHandle;

use crate::core::action::{Action, Effect};
use crate::core::config::{NotificationPermission, ResolvedConfig};
use crate::core::controller::{self, Capabilities, Controller, Variant};
use crate::core::model::{Room, RoomRegistry, User};
use crate::core::scroll::ScrollPolicy;
use crate::core::state::ChatState;
use crate::net::{ApiError, ChannelConfig, ChannelHandle, ChatApi, RoomPayload, channel};
use crate::tui::components::{CreateRoomState, InputBox, MessageListState};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};
use crate::tui::notify::OscFlavor;

/// Upper bound on how long the loop waits for input before ticking.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// How long shutdown waits for the channel to close cleanly.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Which part of the screen receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The message composer. The default.
    Input,
    /// Arrow keys scroll; typing switches back to Input.
    Browse,
    /// The sidebar's room filter.
    Search,
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    Logout,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub focus: Focus,
    /// Create-room dialog (None = hidden)
    pub create_room: Option<CreateRoomState>,
    /// Last `ChatState::sent_count` the composer was cleared for
    sent_seen: u64,
}

impl TuiState {
    pub fn new(policy: ScrollPolicy, variant: Variant) -> Self {
        Self {
            message_list: MessageListState::new(policy, variant == Variant::Minimal),
            input_box: InputBox::new(),
            focus: Focus::Input,
            create_room: None,
            sent_seen: 0,
        }
    }

    /// Align props and overlays with the controller state after updates.
    pub fn sync(&mut self, state: &ChatState) {
        if state.sent_count != self.sent_seen {
            self.sent_seen = state.sent_count;
            self.input_box.clear();
        }
        self.input_box.room_name = state.current_room.as_ref().map(|room| room.name.clone());
        self.input_box.focused = self.focus == Focus::Input && self.create_room.is_none();
        match (state.modal_open, self.create_room.is_some()) {
            (true, false) => self.create_room = Some(CreateRoomState::new()),
            (false, true) => self.create_room = None,
            _ => {}
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // The keyboard protocol is ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            EnableFocusChange,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, focus change, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableFocusChange,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

/// Owns the I/O side of the loop: the channel, background tasks and the
/// senders they report through.
struct Runtime {
    config: ResolvedConfig,
    api: Arc<dyn ChatApi>,
    channel: Option<ChannelHandle>,
    tx: mpsc::Sender<Action>,
    reload_tx: mpsc::Sender<Result<Vec<RoomPayload>, ApiError>>,
    /// History fetch for the current room; superseded fetches are aborted.
    fetch_task: Option<AbortHandle>,
    osc: OscFlavor,
    channel_generation: Arc<AtomicU64>,
}

impl Runtime {
    fn open_channel(&mut self) {
        if let Some(mut old) = self.channel.take() {
            old.close();
        }
        // Events from a channel that has since been replaced are not forwarded
        let generation = self.channel_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.channel_generation);
        let sink = self.tx.clone();
        let config = ChannelConfig {
            url: self.config.ws_url.clone(),
            reconnect_delay: self.config.reconnect_delay,
            session_cookie: self.config.session_cookie.clone(),
        };
        let forward = move |event| {
            if current.load(Ordering::SeqCst) != generation {
                debug!("Dropping {:?} from replaced channel", event);
                return true;
            }
            sink.send(Action::Channel(event)).is_ok()
        };
        match channel::connect(config, forward) {
            Ok(handle) => self.channel = Some(handle),
            Err(e) => warn!("Could not open channel to {}: {}", self.config.ws_url, e),
        }
    }

    fn dispatch(&mut self, controller: &mut dyn Controller, action: Action) -> Option<Exit> {
        let effects = controller.update(action, Instant::now());
        let mut exit = None;
        for effect in effects {
            if let Some(reason) = self.perform(effect) {
                exit = Some(reason);
            }
        }
        exit
    }

    fn perform(&mut self, effect: Effect) -> Option<Exit> {
        match effect {
            Effect::Emit(event) => match &self.channel {
                Some(channel) => {
                    if let Err(e) = channel.emit(event) {
                        warn!("Emit failed: {}", e);
                    }
                }
                None => warn!("No channel, dropping {}", event.name()),
            },
            Effect::FetchMessages {
                room_id,
                page,
                per_page,
            } => {
                if let Some(previous) = self.fetch_task.take() {
                    previous.abort();
                }
                let api = Arc::clone(&self.api);
                let tx = self.tx.clone();
                let task = tokio::spawn(async move {
                    let result = api
                        .fetch_messages(&room_id, page, per_page)
                        .await
                        .map_err(|e| {
                            warn!("Loading messages for {} failed: {}", room_id, e);
                            e.user_message("Failed to load messages")
                        });
                    if tx.send(Action::MessagesLoaded { room_id, result }).is_err() {
                        warn!("Failed to deliver messages: receiver dropped");
                    }
                });
                self.fetch_task = Some(task.abort_handle());
            }
            Effect::CreateRoom(request) => {
                info!("Creating room {}", request.name);
                let api = Arc::clone(&self.api);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.create_room(&request).await.map_err(|e| {
                        warn!("Creating room {} failed: {}", request.name, e);
                        e.user_message("Failed to create room")
                    });
                    if tx.send(Action::RoomCreated(result)).is_err() {
                        warn!("Failed to deliver room creation result: receiver dropped");
                    }
                });
            }
            Effect::PlaySound => {
                if let Err(e) = notify::play_sound() {
                    debug!("Bell failed: {}", e);
                }
            }
            Effect::DesktopNotification { title, body } => {
                if let Err(e) = notify::desktop_notification(self.osc, &title, &body) {
                    debug!("Desktop notification failed: {}", e);
                }
            }
            Effect::Reload => {
                info!("Reloading room list");
                let api = Arc::clone(&self.api);
                let reload_tx = self.reload_tx.clone();
                tokio::spawn(async move {
                    if reload_tx.send(api.list_rooms().await).is_err() {
                        warn!("Failed to deliver room list: receiver dropped");
                    }
                });
            }
            Effect::Logout => return Some(Exit::Logout),
            Effect::Quit => return Some(Exit::Quit),
        }
        None
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        if let Some(mut channel) = self.channel.take() {
            channel.close();
            // The channel task runs on another worker; give it a moment to
            // send the Close frame before the runtime goes away
            let deadline = Instant::now() + CLOSE_GRACE;
            while !channel.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

fn new_controller(
    config: &ResolvedConfig,
    variant: Variant,
    user: User,
    rooms: Vec<RoomPayload>,
    notifications: NotificationPermission,
) -> Box<dyn Controller> {
    let registry = RoomRegistry::from_rooms(rooms.into_iter().map(Room::from));
    info!("Starting {:?} controller with {} rooms", variant, registry.len());
    let state = ChatState::new(user, registry, notifications);
    controller::build(variant, state, config.controller.clone(), Instant::now())
}

/// Run the chat UI until the user quits or logs out.
///
/// Must be called from within a tokio runtime: history loads, room
/// creation and the channel run as spawned tasks.
pub fn run(
    config: ResolvedConfig,
    api: Arc<dyn ChatApi>,
    rooms: Vec<RoomPayload>,
) -> io::Result<Exit> {
    let capabilities = Capabilities {
        mode: config.ui_mode,
        term: std::env::var("TERM").ok(),
        terminal_size: crossterm::terminal::size().ok(),
    };
    let report = controller::probe(&capabilities);
    info!(
        "UI probe selected {:?}: {}",
        report.variant,
        report.reasons.join("; ")
    );
    let variant = report.variant;
    let narrow_width = config.controller.narrow_width;

    let mut controller = new_controller(
        &config,
        variant,
        User::new(config.username.clone()),
        rooms,
        config.notifications,
    );
    let mut tui = TuiState::new(config.scroll, variant);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Actions from background tasks and the channel
    let (tx, rx) = mpsc::channel();
    let (reload_tx, reload_rx) = mpsc::channel();
    let mut runtime = Runtime {
        config,
        api,
        channel: None,
        tx,
        reload_tx,
        fetch_task: None,
        osc: OscFlavor::from_env(),
        channel_generation: Arc::new(AtomicU64::new(0)),
    };
    runtime.open_channel();

    let size = terminal.size()?;
    let mut exit = runtime.dispatch(
        controller.as_mut(),
        Action::Resize {
            width: size.width,
            height: size.height,
        },
    );

    while exit.is_none() {
        tui.sync(controller.state());
        terminal.draw(|f| ui::draw_ui(f, controller.state(), variant, narrow_width, &mut tui))?;

        // Process the first event + drain all pending ones before the next draw
        let area = terminal.get_frame().area();
        let first_event = poll_event_timeout(TICK_INTERVAL);
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let input_height = tui.input_box.calculate_height(ui::main_column_width(
                area,
                controller.state(),
                variant,
                narrow_width,
            ));
            let screen =
                ui::compute_layout(area, controller.state(), variant, narrow_width, input_height);
            let actions =
                router::route_event(event, controller.state(), variant, &mut tui, &screen);
            for action in actions {
                if let Some(reason) = runtime.dispatch(controller.as_mut(), action) {
                    exit = Some(reason);
                }
            }
            tui.sync(controller.state());
        }

        if let Some(reason) = runtime.dispatch(controller.as_mut(), Action::Tick) {
            exit = Some(reason);
        }

        while let Ok(action) = rx.try_recv() {
            debug!("Event loop received: {:?}", action);
            if let Some(reason) = runtime.dispatch(controller.as_mut(), action) {
                exit = Some(reason);
            }
        }

        while let Ok(result) = reload_rx.try_recv() {
            match result {
                Ok(rooms) => {
                    let user = controller.state().user.clone();
                    let notifications = controller.state().notifications;
                    controller =
                        new_controller(&runtime.config, variant, user, rooms, notifications);
                    tui = TuiState::new(runtime.config.scroll, variant);
                    runtime.open_channel();
                    let size = terminal.size()?;
                    runtime.dispatch(
                        controller.as_mut(),
                        Action::Resize {
                            width: size.width,
                            height: size.height,
                        },
                    );
                }
                Err(e) => warn!("Reload failed, keeping current rooms: {}", e),
            }
        }
    }

    let exit = exit.unwrap_or(Exit::Quit);
    info!("Leaving event loop: {:?}", exit);
    runtime.shutdown();
    ratatui::restore();
    Ok(exit)
}
