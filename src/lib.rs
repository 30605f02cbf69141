//! Musify Server Library
//!
//! Aggregates an artist profile from MusicBrainz, Wikidata, Wikipedia and
//! the Cover Art Archive. Modules are exposed for the binary and for the
//! end-to-end tests.

pub mod config;
pub mod profile;
pub mod server;
pub mod upstream;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use profile::{ArtistProfile, ProfileError, ProfileOrchestrator};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
