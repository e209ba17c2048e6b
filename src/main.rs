//! # image-dedup CLI
//!
//! Command-line interface for the event image deduplicator.
//!
//! ## Usage
//! ```bash
//! image-dedup dedup public/events/acme/event-7/images --threshold 5
//! image-dedup event inventory --all --catalog public/events/details.json
//! ```

mod cli;

use event_image_dedup::Result;

fn main() -> Result<()> {
    cli::run()
}
