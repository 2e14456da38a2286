//! A [`Surface`] for text terminals

use std::io::{stdout, Write};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::alert::Alert;
use crate::app::{Surface, UiEvent};
use crate::clock::ClockDisplay;
use crate::render::TaskView;
use crate::schedule::{Panel, SchedulePanels};
use crate::submission::DeadlineBounds;
use crate::task::TaskId;

/// The tasks as they were last listed, so that typed commands can refer to them by position
pub type ListedTasks = Arc<Mutex<Vec<(TaskId, bool)>>>;

/// Prints everything to the standard output.
///
/// The clock goes to the terminal title, so that it does not scroll the rest away every second
#[derive(Default)]
pub struct TerminalSurface {
    listed: ListedTasks,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to the tasks that are currently listed, by position (starting at 1)
    pub fn listed_tasks(&self) -> ListedTasks {
        Arc::clone(&self.listed)
    }
}

impl Surface for TerminalSurface {
    fn show_clock(&mut self, clock: &ClockDisplay) {
        let mut out = stdout();
        let _ = write!(out, "\x1b]2;{}  {}\x07", clock.time, clock.date);
        let _ = out.flush();
    }

    fn show_schedule(&mut self, panels: &SchedulePanels) {
        println!("---- 오늘 일정 -----");
        print_panel(&panels.today);
        println!("---- 이번 주 일정 -----");
        print_panel(&panels.week);
    }

    fn show_board(&mut self, welcome: &str, bounds: &DeadlineBounds) {
        println!("{}", welcome);
        println!("Deadlines must be between {} and {}.", bounds.min_input(), bounds.max_input());
        println!("Commands: '+ <HH:MM> <task>', 't <n>' to toggle, 'd <n>' to delete, 'rm <id>', 'q' to quit");
    }

    fn show_tasks(&mut self, tasks: &[TaskView]) {
        println!("---- 할 일 -----");
        for (position, task) in tasks.iter().enumerate() {
            print_task(position + 1, task);
        }
        match self.listed.lock() {
            Ok(mut listed) => *listed = tasks.iter().map(|t| (t.id.clone(), t.completed)).collect(),
            Err(_) => log::warn!("Listed tasks are poisoned, commands may refer to stale positions"),
        }
    }

    fn clear_task_form(&mut self) {
        // Typed lines are consumed as they are read, there is nothing left to clear
    }

    fn alert(&mut self, alert: &Alert) {
        println!("(!) {}", alert);
    }
}

fn print_panel(panel: &Panel) {
    match panel {
        Panel::Empty(placeholder) => println!("    {}", placeholder),
        Panel::Events(events) => {
            for event in events {
                println!("    {}\t{}", event.name, event.date);
            }
        },
    }
}

/// Turn a typed line into an event, once a session has started.
///
/// * `+ <deadline> <text>` submits a task. The deadline is either `HH:MM` (today) or a full `YYYY-MM-DDTHH:MM`
/// * `t <n>` toggles the n-th listed task
/// * `d <n>` deletes the n-th listed task
/// * `rm <id>` deletes a task by identifier
/// * `q` quits
pub fn parse_command(line: &str, listed: &[(TaskId, bool)], today: NaiveDate) -> Option<UiEvent> {
    let line = line.trim();
    let (command, rest) = match line.find(char::is_whitespace) {
        None => (line, ""),
        Some(pos) => (&line[..pos], line[pos..].trim()),
    };

    match command {
        "q" => Some(UiEvent::Quit),
        "+" => {
            let (deadline, text) = match rest.find(char::is_whitespace) {
                None => (rest, ""),
                Some(pos) => (&rest[..pos], rest[pos..].trim()),
            };
            let deadline = if deadline.len() == 5 && deadline.as_bytes().get(2) == Some(&b':') {
                format!("{}T{}", today.format("%Y-%m-%d"), deadline)
            } else {
                deadline.to_string()
            };
            Some(UiEvent::SubmitTask { text: text.to_string(), deadline })
        },
        "t" => listed_at(listed, rest).map(|(id, completed)| UiEvent::Toggle { id: id.clone(), completed: *completed }),
        "d" => listed_at(listed, rest).map(|(id, _)| UiEvent::DeleteFromList(id.clone())),
        "rm" if rest.is_empty() == false => Some(UiEvent::Delete(TaskId::from(rest))),
        _ => None,
    }
}

fn listed_at<'a>(listed: &'a [(TaskId, bool)], arg: &str) -> Option<&'a (TaskId, bool)> {
    let position: usize = arg.parse().ok()?;
    listed.get(position.checked_sub(1)?)
}

/// Pretty-print a task row
pub fn print_task(position: usize, task: &TaskView) {
    let completion = if task.completed { "✓" } else { " " };
    println!("{:>3}. [{}] {}\t마감: {} ({})\t{}", position, completion, task.text, task.deadline_label, task.time_left, task.id);
}
