//! # Event Image Dedup
//!
//! Keeps event promo image folders free of near-duplicates.
//!
//! Every image in a folder gets a 64-bit difference hash (dHash). Images are
//! visited in numeric order; any image within the Hamming-distance threshold
//! of an earlier kept image is removed, and the survivors are renamed to a
//! dense `image-0`, `image-1`, ... sequence.
//!
//! ## Architecture
//! - `core` - The deduplication engine and catalog plumbing
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Verbosity comes
/// from `RUST_LOG`.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("tracing already initialized: {}", e);
    }
}
