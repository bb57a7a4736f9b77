//! Runtime template pool with layout composition and modification-time reloading.
//!
//! Templates are registered by name from a content directory (or from text),
//! optionally wrapped in header/footer layouts, and rendered with any
//! `serde::Serialize` data into any `std::io::Write`. Rendering uses
//! [Tera](https://docs.rs/tera).
//!
//! In development, construct the pool with auto-reload on: every render probes
//! the template's source files and transparently reparses it when one changed.
//! In production leave it off and each template is parsed once, at registration.
//!
//! ```no_run
//! use platepool::{Delimiters, Pool};
//!
//! # fn main() -> platepool::PoolResult<()> {
//! let mut pool = Pool::new("templates", cfg!(debug_assertions));
//! pool.register_layout("main", "header", "footer", &Delimiters::standard())?;
//! pool.register("index", &Delimiters::standard())?;
//!
//! let html = pool.render_to_string("main", "index", &serde_json::json!({ "title": "Home" }))?;
//! # let _ = html;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`artifact`]: Source files backing a template and the staleness probe
//! - [`config`]: Pool settings, loadable from TOML
//! - [`helpers`]: Helper functions installed into every template

pub mod artifact;
mod compiled;
pub mod config;
mod delimiters;
pub mod error;
pub mod helpers;
mod layout;
mod pool;

pub use artifact::{Artifact, ArtifactSet, ArtifactStore, FsStore};
pub use compiled::CompiledTemplate;
pub use config::{PoolConfig, ReloadVerbosity};
pub use delimiters::Delimiters;
pub use error::{ConfigError, PoolError, PoolResult};
pub use layout::LayoutBinding;
pub use pool::Pool;
