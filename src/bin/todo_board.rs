use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use todo_board::app::{App, UiEvent};
use todo_board::client::Client;
use todo_board::config;
use todo_board::store::firestore_store::FirestoreStore;
use todo_board::store::memory_store::MemoryStore;
use todo_board::terminal::{parse_command, ListedTasks, TerminalSurface};
use todo_board::traits::TaskStore;

const DEFAULT_STORE_FILE: &str = "todo_board.json";


#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    apply_overrides();

    let store = open_store();
    let schedule = match Client::new() {
        Ok(client) => client,
        Err(err) => {
            log::error!("Invalid schedule API settings: {}", err);
            return;
        },
    };

    let surface = TerminalSurface::new();
    let listed = surface.listed_tasks();

    println!("닉네임을 입력하세요:");
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(read_commands(tx, listed));

    App::new(store, Arc::new(schedule), surface).run(rx).await;
}

/// Point the schedule display to another school, or the tasks to another collection
fn apply_overrides() {
    let overrides = [
        ("NEIS_OFFICE_CODE", &config::EDUCATION_OFFICE_CODE),
        ("NEIS_SCHOOL_CODE", &config::SCHOOL_CODE),
        ("TODO_BOARD_COLLECTION", &config::TASK_COLLECTION),
    ];
    for (variable, setting) in overrides.iter() {
        if let Ok(value) = std::env::var(variable) {
            log::info!("{} is set, using {}", variable, value);
            config::set(setting, value);
        }
    }
}

/// Share tasks through Firestore if a project is configured, or keep them in a local file otherwise
fn open_store() -> Arc<dyn TaskStore> {
    if let Ok(project) = std::env::var("FIRESTORE_PROJECT") {
        log::info!("Using Firestore project {}", project);
        return Arc::new(FirestoreStore::new(project, std::env::var("FIRESTORE_API_KEY").ok()));
    }

    let path = PathBuf::from(std::env::var("TODO_BOARD_FILE").unwrap_or_else(|_| DEFAULT_STORE_FILE.to_string()));
    let store = match MemoryStore::from_file(&path) {
        Ok(store) => store,
        Err(err) => {
            log::warn!("Invalid store file: {}. Using an empty store", err);
            MemoryStore::new_with_file(&path)
        }
    };
    Arc::new(store)
}

/// Forward typed lines to the event loop, until the standard input is closed
async fn read_commands(tx: mpsc::Sender<UiEvent>, listed: ListedTasks) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut has_nickname = false;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                log::error!("Unable to read the standard input: {}", err);
                break;
            },
        };

        let event = if has_nickname {
            let listed = match listed.lock() {
                Ok(listed) => listed.clone(),
                Err(_) => Vec::new(),
            };
            match parse_command(&line, &listed, Local::now().naive_local().date()) {
                Some(event) => event,
                None => {
                    println!("Unknown command: {}", line);
                    continue;
                },
            }
        } else {
            has_nickname = line.trim().is_empty() == false;
            UiEvent::Nickname(line)
        };

        if tx.send(event).await.is_err() {
            return;
        }
    }

    let _ = tx.send(UiEvent::Quit).await;
}
