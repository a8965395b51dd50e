//! # ripple-core
//!
//! A minimal push-based observable runtime on top of Tokio.
//!
//! ## Features
//!
//! - **Sources**: `just`, `interval`, `from_event_source` / `from_stream`,
//!   `empty`, `throw`, `create`
//! - **Operators**: `take`, `do_on_next` / `try_do_on_next`, `do_on_completed`
//! - **Cooperative cancellation**: one-way [`CancelContext`] shared between a
//!   subscription and its producer task
//! - **Typed terminal events**: errors arrive as [`Event::Error`] and never
//!   panic the caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ripple_core::{Event, Observable};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ticks = Observable::interval(Duration::from_millis(100))?
//!         .do_on_next(|tick| println!("tick {}", tick))
//!         .take(5);
//!
//!     let mut sub = ticks.observe()?;
//!     while let Some(event) = sub.next_event().await {
//!         match event {
//!             Event::Value(v) => println!("value {}", v),
//!             Event::Error(e) => return Err(e.into()),
//!             Event::Complete => println!("done"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod error;
pub mod event;
pub mod observable;
pub mod observer;
mod operators;
pub mod producer;
mod sources;
pub mod subscription;

pub use cancel::{CancelContext, CancelState};
pub use error::{BoxError, Result, RxError};
pub use event::Event;
pub use observable::Observable;
pub use observer::{BoxObserver, Flow, Observer};
pub use producer::Producer;
pub use subscription::{BlockingEvents, Subscription};
