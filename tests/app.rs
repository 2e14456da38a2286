//! End-to-end scenarios of the event loop, with a recording display

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::mpsc;

use todo_board::{Alert, BoxError, TaskId};
use todo_board::app::{App, Surface, UiEvent};
use todo_board::clock::ClockDisplay;
use todo_board::mock_behaviour::MockBehaviour;
use todo_board::render::{TaskView, TimeLeft};
use todo_board::schedule::{Panel, ScheduleEvent, SchedulePanels, NO_EVENTS_TODAY, NO_EVENTS_THIS_WEEK};
use todo_board::store::memory_store::MemoryStore;
use todo_board::submission::DeadlineBounds;
use todo_board::traits::{ScheduleSource, TaskStore};


#[derive(Default, Debug)]
struct Recorded {
    clocks: Vec<ClockDisplay>,
    schedules: Vec<SchedulePanels>,
    welcome: Option<String>,
    bounds: Option<DeadlineBounds>,
    task_lists: Vec<Vec<TaskView>>,
    form_clears: usize,
    alerts: Vec<Alert>,
}

#[derive(Clone, Default)]
struct RecordingSurface {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSurface {
    fn check<T, F: FnOnce(&Recorded) -> T>(&self, f: F) -> T {
        f(&self.recorded.lock().unwrap())
    }
}

impl Surface for RecordingSurface {
    fn show_clock(&mut self, clock: &ClockDisplay) {
        self.recorded.lock().unwrap().clocks.push(clock.clone());
    }
    fn show_schedule(&mut self, panels: &SchedulePanels) {
        self.recorded.lock().unwrap().schedules.push(panels.clone());
    }
    fn show_board(&mut self, welcome: &str, bounds: &DeadlineBounds) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.welcome = Some(welcome.to_string());
        recorded.bounds = Some(bounds.clone());
    }
    fn show_tasks(&mut self, tasks: &[TaskView]) {
        self.recorded.lock().unwrap().task_lists.push(tasks.to_vec());
    }
    fn clear_task_form(&mut self) {
        self.recorded.lock().unwrap().form_clears += 1;
    }
    fn alert(&mut self, alert: &Alert) {
        self.recorded.lock().unwrap().alerts.push(alert.clone());
    }
}


enum FakeSchedule {
    Events(Vec<ScheduleEvent>),
    Failing,
}

#[async_trait]
impl ScheduleSource for FakeSchedule {
    async fn fetch_events(&self, _day: NaiveDate) -> Result<Vec<ScheduleEvent>, BoxError> {
        match self {
            FakeSchedule::Events(events) => Ok(events.clone()),
            FakeSchedule::Failing => Err("network is unreachable".into()),
        }
    }
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

struct Harness {
    surface: RecordingSurface,
    store: Arc<MemoryStore>,
    tx: mpsc::Sender<UiEvent>,
    handle: tokio::task::JoinHandle<RecordingSurface>,
}

impl Harness {
    fn start(store: MemoryStore, schedule: FakeSchedule) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let surface = RecordingSurface::default();
        let store = Arc::new(store);
        let app = App::new(store.clone(), Arc::new(schedule), surface.clone()).with_clock(noon);
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(app.run(rx));
        Self { surface, store, tx, handle }
    }

    async fn send(&self, event: UiEvent) {
        self.tx.send(event).await.unwrap();
    }

    /// Wait until the recorded display satisfies a condition
    async fn wait_for<F: Fn(&Recorded) -> bool>(&self, condition: F) {
        for _ in 0..200 {
            if self.surface.check(&condition) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Condition not met. Display is {:?}", self.surface.check(|r| format!("{:?}", r)));
    }

    async fn stop(self) -> RecordingSurface {
        self.send(UiEvent::Quit).await;
        self.handle.await.unwrap()
    }
}


#[tokio::test]
async fn nickname_then_task() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![]));

    harness.send(UiEvent::Nickname("민수".to_string())).await;
    harness.wait_for(|r| r.welcome.is_some()).await;
    harness.surface.check(|r| {
        assert!(r.welcome.as_ref().unwrap().contains("민수"));
        assert_eq!(r.bounds.as_ref().unwrap().min_input(), "2026-10-19T00:00");
        assert_eq!(r.bounds.as_ref().unwrap().max_input(), "2026-10-19T23:59");
        // The initial snapshot is rendered at once
        assert_eq!(r.task_lists.last().map(|l| l.len()), Some(0));
    });

    harness.send(UiEvent::SubmitTask { text: "숙제".to_string(), deadline: "2026-10-19T13:00".to_string() }).await;
    harness.wait_for(|r| r.task_lists.last().map(|l| l.len()) == Some(1)).await;

    harness.surface.check(|r| {
        assert_eq!(r.form_clears, 1);
        let view = &r.task_lists.last().unwrap()[0];
        assert_eq!(view.text, "숙제");
        assert_eq!(view.completed, false);
        assert_eq!(view.time_left, TimeLeft::Remaining { hours: 1, minutes: 0 });
        assert!(r.alerts.is_empty());
    });
    let snapshot = harness.store.snapshot();
    assert_eq!(snapshot.tasks()[0].user_name(), "민수");

    harness.stop().await;
}

#[tokio::test]
async fn blank_nicknames_start_nothing() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![]));

    harness.send(UiEvent::Nickname("   ".to_string())).await;
    harness.send(UiEvent::Nickname("".to_string())).await;
    // Task operations are ignored as long as there is no session
    harness.send(UiEvent::SubmitTask { text: "숙제".to_string(), deadline: "2026-10-19T13:00".to_string() }).await;

    let surface = harness.stop().await;
    surface.check(|r| {
        assert!(r.welcome.is_none());
        assert!(r.task_lists.is_empty());
        assert_eq!(r.form_clears, 0);
    });
}

#[tokio::test]
async fn rejected_deadlines() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![]));
    harness.send(UiEvent::Nickname("민수".to_string())).await;

    harness.send(UiEvent::SubmitTask { text: "숙제".to_string(), deadline: "2026-10-19T11:00".to_string() }).await;
    harness.send(UiEvent::SubmitTask { text: "숙제".to_string(), deadline: "2026-10-20T11:00".to_string() }).await;
    harness.send(UiEvent::SubmitTask { text: "".to_string(), deadline: "2026-10-19T13:00".to_string() }).await;
    harness.wait_for(|r| r.alerts.len() == 2).await;
    assert!(harness.store.snapshot().is_empty());

    let surface = harness.stop().await;
    surface.check(|r| {
        assert_eq!(r.alerts, vec![Alert::DeadlineNotAfterNow, Alert::DeadlineNotToday]);
        assert_eq!(r.form_clears, 0);
    });
}

#[tokio::test]
async fn toggle_and_delete_through_the_list() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![]));
    harness.send(UiEvent::Nickname("민수".to_string())).await;
    harness.send(UiEvent::SubmitTask { text: "숙제".to_string(), deadline: "2026-10-19T13:00".to_string() }).await;
    harness.wait_for(|r| r.task_lists.last().map(|l| l.len()) == Some(1)).await;

    let id = harness.surface.check(|r| r.task_lists.last().unwrap()[0].id.clone());
    harness.send(UiEvent::Toggle { id: id.clone(), completed: false }).await;
    harness.wait_for(|r| r.task_lists.last().map(|l| l[0].completed) == Some(true)).await;

    harness.send(UiEvent::DeleteFromList(id)).await;
    harness.wait_for(|r| r.task_lists.last().map(|l| l.is_empty()) == Some(true)).await;

    let surface = harness.stop().await;
    surface.check(|r| assert!(r.alerts.is_empty()));
}

#[tokio::test]
async fn failed_deletions() {
    let mut store = MemoryStore::new();
    store.set_mock_behaviour(Some(Arc::new(Mutex::new(MockBehaviour::fail_now(2)))));
    let harness = Harness::start(store, FakeSchedule::Events(vec![]));
    harness.send(UiEvent::Nickname("민수".to_string())).await;

    // From the list: logged only
    harness.send(UiEvent::DeleteFromList(TaskId::from("missing"))).await;
    // Directly: an alert is shown
    harness.send(UiEvent::Delete(TaskId::from("missing"))).await;
    harness.wait_for(|r| r.alerts.is_empty() == false).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let surface = harness.stop().await;
    surface.check(|r| assert_eq!(r.alerts, vec![Alert::DeleteFailed]));
}

#[tokio::test]
async fn clock_is_shown_at_startup() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![]));
    harness.wait_for(|r| r.clocks.is_empty() == false).await;

    let surface = harness.stop().await;
    surface.check(|r| {
        assert_eq!(r.clocks[0].time, "12:00:00");
        assert_eq!(r.clocks[0].date, "2026년 10월 19일 월요일");
    });
}

#[tokio::test]
async fn schedule_events_go_to_both_panels() {
    let event = ScheduleEvent { name: "중간고사".to_string(), date: "20261019".to_string() };
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![event.clone()]));
    harness.wait_for(|r| r.schedules.is_empty() == false).await;

    let surface = harness.stop().await;
    surface.check(|r| {
        assert_eq!(r.schedules[0].today, Panel::Events(vec![event.clone()]));
        assert_eq!(r.schedules[0].week, Panel::Events(vec![event.clone()]));
    });
}

#[tokio::test]
async fn empty_schedule_shows_placeholders() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![]));
    harness.wait_for(|r| r.schedules.is_empty() == false).await;

    let surface = harness.stop().await;
    surface.check(|r| {
        assert_eq!(r.schedules[0].today, Panel::Empty(NO_EVENTS_TODAY));
        assert_eq!(r.schedules[0].week, Panel::Empty(NO_EVENTS_THIS_WEEK));
    });
}

#[tokio::test]
async fn failing_schedule_shows_placeholders() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Failing);
    harness.wait_for(|r| r.schedules.is_empty() == false).await;

    let surface = harness.stop().await;
    surface.check(|r| {
        assert_eq!(r.schedules[0].today, Panel::Empty(NO_EVENTS_TODAY));
        assert_eq!(r.schedules[0].week, Panel::Empty(NO_EVENTS_THIS_WEEK));
    });
}

#[tokio::test]
async fn writes_from_other_clients_are_rendered() {
    let harness = Harness::start(MemoryStore::new(), FakeSchedule::Events(vec![]));
    harness.send(UiEvent::Nickname("민수".to_string())).await;
    harness.wait_for(|r| r.welcome.is_some()).await;

    let deadline = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(15, 30, 0).unwrap();
    harness.store.add_task(todo_board::NewTask::new("from elsewhere".to_string(), "영희".to_string(), deadline)).await.unwrap();
    harness.wait_for(|r| r.task_lists.last().map(|l| l.len()) == Some(1)).await;

    let surface = harness.stop().await;
    surface.check(|r| {
        let view = &r.task_lists.last().unwrap()[0];
        assert_eq!(view.text, "from elsewhere");
        assert_eq!(view.time_left, TimeLeft::Remaining { hours: 3, minutes: 30 });
        assert_eq!(view.deadline_label, "오후 3:30:00");
    });
}
