//! The event loop, that ties timers, user input, the task subscription and the display together
//!
//! Everything runs on a single task. Store writes and schedule fetches are spawned, so that the loop never waits
//! for them; their outcome comes back either through the task subscription, or through internal channels.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::alert::Alert;
use crate::board::TaskBoard;
use crate::clock::ClockDisplay;
use crate::config;
use crate::render::{render_list, TaskView};
use crate::schedule::{fetch_or_empty, ScheduleEvent, SchedulePanels};
use crate::session::SessionGate;
use crate::store::SnapshotReceiver;
use crate::submission::{validate, DeadlineBounds};
use crate::task::TaskId;
use crate::traits::{ScheduleSource, TaskStore};


/// Where the application displays things
pub trait Surface: Send {
    fn show_clock(&mut self, clock: &ClockDisplay);
    fn show_schedule(&mut self, panels: &SchedulePanels);
    /// Hide the nickname prompt and reveal the task board
    fn show_board(&mut self, welcome: &str, bounds: &DeadlineBounds);
    /// Replace the whole task list
    fn show_tasks(&mut self, tasks: &[TaskView]);
    fn clear_task_form(&mut self);
    fn alert(&mut self, alert: &Alert);
}

/// Something the user did
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    /// A nickname has been submitted
    Nickname(String),
    /// The task form has been submitted, with the raw content of its inputs
    SubmitTask { text: String, deadline: String },
    /// A task checkbox has been clicked. `completed` is the status the task was displayed with
    Toggle { id: TaskId, completed: bool },
    /// The delete control of a listed task has been clicked
    DeleteFromList(TaskId),
    /// A task has been deleted by identifier, outside of the list
    Delete(TaskId),
    Quit,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}


pub struct App<U: Surface> {
    board: TaskBoard,
    schedule: Arc<dyn ScheduleSource>,
    surface: U,
    gate: SessionGate,
    subscription: Option<SnapshotReceiver>,
    now: fn() -> NaiveDateTime,
}

impl<U: Surface> App<U> {
    pub fn new(store: Arc<dyn TaskStore>, schedule: Arc<dyn ScheduleSource>, surface: U) -> Self {
        Self {
            board: TaskBoard::new(store),
            schedule,
            surface,
            gate: SessionGate::new(),
            subscription: None,
            now: local_now,
        }
    }

    /// Use another source for the current local time
    pub fn with_clock(mut self, now: fn() -> NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Run until a [`UiEvent::Quit`] is received, or until the event channel is closed.
    ///
    /// Returns the surface, and drops the task subscription and every timer.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> U {
        let mut clock_timer = tokio::time::interval(config::CLOCK_PERIOD);
        clock_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut schedule_timer = tokio::time::interval(config::SCHEDULE_REFRESH_PERIOD);
        schedule_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (schedule_tx, mut schedule_rx) = mpsc::unbounded_channel();
        let (alert_tx, mut alert_rx) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                _ = clock_timer.tick() => {
                    let clock = ClockDisplay::at(&(self.now)());
                    self.surface.show_clock(&clock);
                },
                _ = schedule_timer.tick() => self.spawn_schedule_fetch(schedule_tx.clone()),
                Some(fetched) = schedule_rx.recv() => {
                    self.surface.show_schedule(&SchedulePanels::from_events(fetched));
                },
                Some(alert) = alert_rx.recv() => self.surface.alert(&alert),
                still_open = next_snapshot(&mut self.subscription) => {
                    if still_open {
                        self.render_tasks();
                    } else {
                        log::warn!("The task store closed the subscription");
                        self.subscription = None;
                    }
                },
                event = events.recv() => match event {
                    None | Some(UiEvent::Quit) => break,
                    Some(event) => self.handle_event(event, &alert_tx),
                },
            }
        }

        log::debug!("Event loop stopped");
        self.surface
    }

    fn handle_event(&mut self, event: UiEvent, alert_tx: &mpsc::UnboundedSender<Alert>) {
        if let UiEvent::Nickname(input) = &event {
            if self.gate.is_unlocked() == false {
                self.start_session(input);
            }
            return;
        }
        let session = match self.gate.session() {
            None => {
                log::debug!("Ignoring {:?}, no session has started", event);
                return;
            },
            Some(session) => session.clone(),
        };

        match event {
            UiEvent::SubmitTask { text, deadline } => {
                match validate(&text, &deadline, (self.now)()) {
                    Ok(None) => {},
                    Err(alert) => self.surface.alert(&alert),
                    Ok(Some(draft)) => {
                        let board = self.board.clone();
                        tokio::spawn(async move {
                            board.create(&session, draft).await;
                        });
                        self.surface.clear_task_form();
                    },
                }
            },
            UiEvent::Toggle { id, completed } => {
                let board = self.board.clone();
                tokio::spawn(async move {
                    board.toggle(&id, completed).await;
                });
            },
            UiEvent::DeleteFromList(id) => {
                let board = self.board.clone();
                tokio::spawn(async move {
                    board.delete_from_list(&id).await;
                });
            },
            UiEvent::Delete(id) => {
                let board = self.board.clone();
                let alert_tx = alert_tx.clone();
                tokio::spawn(async move {
                    if let Err(alert) = board.delete(&id).await {
                        let _ = alert_tx.send(alert);
                    }
                });
            },
            UiEvent::Nickname(_) | UiEvent::Quit => {},
        }
    }

    fn start_session(&mut self, input: &str) {
        let session = match self.gate.submit(input) {
            None => return,
            Some(session) => session.clone(),
        };

        let bounds = DeadlineBounds::for_day((self.now)().date());
        self.surface.show_board(&session.welcome_message(), &bounds);
        self.subscription = Some(self.board.subscribe(&session));
        self.render_tasks();
    }

    /// Render the latest snapshot, from scratch
    fn render_tasks(&mut self) {
        let now = (self.now)();
        let views = match &mut self.subscription {
            None => return,
            Some(rx) => render_list(&rx.borrow_and_update(), &now),
        };
        self.surface.show_tasks(&views);
    }

    fn spawn_schedule_fetch(&self, schedule_tx: mpsc::UnboundedSender<Vec<ScheduleEvent>>) {
        let source = Arc::clone(&self.schedule);
        let day = (self.now)().date();
        tokio::spawn(async move {
            let events = fetch_or_empty(source.as_ref(), day).await;
            let _ = schedule_tx.send(events);
        });
    }
}

/// Wait for the next snapshot. Returns false if the store has gone.
/// Never returns until there is a subscription.
async fn next_snapshot(subscription: &mut Option<SnapshotReceiver>) -> bool {
    match subscription {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}
