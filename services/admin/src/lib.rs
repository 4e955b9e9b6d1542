//! Portfolio admin console
//!
//! Session handling, access gating and resource management for the
//! portfolio back office. The `admin` binary wires these together behind a
//! command line; everything here is usable on its own against any API that
//! speaks the same endpoints.

pub mod console;
pub mod gate;
pub mod prompt;
pub mod resource;
pub mod session;
pub mod stats;
pub mod storage;

pub use console::{Cli, Command, Console};
pub use gate::View;
pub use prompt::{Prompt, TerminalPrompt};
pub use resource::{DateRange, Query, ResourceManager};
pub use session::{Readiness, SessionSnapshot, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
