//! # Events Module
//!
//! Progress reporting for directory runs.
//!
//! ## Design
//! The core library emits events through channels, so the CLI (or any other
//! front end) can subscribe and display progress without the core knowing
//! about terminals.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = events::channel();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Dedup(DedupEvent::Rejected { path, .. }) = event {
//!             println!("duplicate: {}", path.display());
//!         }
//!     }
//! });
//!
//! deduper.run_with_events(&dir, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{channel, null_sender, EventReceiver, EventSender};
pub use types::*;
