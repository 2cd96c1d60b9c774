//! tmpc: lifecycle service for temporary, disposable browsing containers.
//!
//! A container is "temporary" when its name carries a fingerprint this
//! service can re-derive from the container's durable id alone. Temporary
//! containers are destroyed the moment their last tab closes. State is
//! deliberately volatile: it is rebuilt from the host's directories on
//! startup and re-corrected by every reconciliation pass, so the service
//! survives reloads, races, and event bursts without persistent storage.

pub mod app;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod memdir;
pub mod neighbors;
pub mod palette;
pub mod scheduler;
pub mod state;

pub use app::App;
pub use error::{Error, Result};
pub use events::run_event_loop;
pub use fingerprint::{CONTAINER_MARK, generate_fingerprint, is_marked, is_owned};
pub use memdir::MemoryDirectory;
pub use palette::{PALETTE, pick_color};
pub use scheduler::DebouncedCleanup;
