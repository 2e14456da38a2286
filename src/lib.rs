//! This crate provides a shared to-do board.
//!
//! Tasks live in a [`TaskStore`](traits::TaskStore), that pushes a full snapshot of its content to every subscriber
//! whenever anything changes. Two stores are provided: an in-process [`MemoryStore`](store::memory_store::MemoryStore),
//! and a [`FirestoreStore`](store::firestore_store::FirestoreStore) that shares tasks through a Firestore collection.
//!
//! The [`App`](app::App) event loop ties everything together: a nickname [`session`] gates the board, task writes go
//! through a [`TaskBoard`](board::TaskBoard), every snapshot is [`render`]ed from scratch, a [`clock`] ticks every
//! second and the school schedule is fetched every hour by a [`client`].

pub mod traits;
pub mod config;

mod task;
pub use task::{NewTask, Task, TaskId};
pub use task::{format_deadline, parse_deadline};
pub mod store;
pub mod mock_behaviour;

pub mod alert;
pub use alert::Alert;
pub mod session;
pub mod submission;
pub mod board;
pub mod render;
pub mod clock;

pub mod client;
pub mod schedule;

pub mod app;
pub mod terminal;

/// The error type of every fallible store or network operation
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
