//! Shared constants for end-to-end tests
//!
//! Artist ids map to fixtures served by the stub upstreams. When the
//! fixtures change, update only this file and `upstreams.rs`.

// ============================================================================
// Artist IDs
// ============================================================================

/// Complete profile: wikidata relation, english sitelink, mixed release groups
pub const ARTIST_OK_ID: &str = "f4abc0b5-3f7a-4eff-8f78-ac078dbce533";

/// Artist without a wikidata relation
pub const ARTIST_NO_WIKIDATA_ID: &str = "no-wikidata";

/// Unknown to the metadata service (404)
pub const ARTIST_UNKNOWN_ID: &str = "unknown-artist";

/// Answers 400 three times before succeeding
pub const ARTIST_FLAKY_ID: &str = "flaky-artist";

/// Always answers 400
pub const ARTIST_ALWAYS_400_ID: &str = "always-400";

/// Linked entity has no english sitelink
pub const ARTIST_NO_ENWIKI_ID: &str = "no-enwiki";

/// Linked entity is missing from the wikidata envelope
pub const ARTIST_BROKEN_ENTITY_ID: &str = "broken-entity";

/// English page summary is missing (404)
pub const ARTIST_NO_SUMMARY_ID: &str = "no-summary";

// ============================================================================
// Expected profile values
// ============================================================================

pub const ARTIST_OK_NAME: &str = "Douglas Adams";

pub const ARTIST_OK_DESCRIPTION: &str = "<p>Douglas Adams was an English author.</p>";

/// Release group whose cover art lists two images
pub const RG_TWO_IMAGES_ID: &str = "rg-two-images";

/// Release group whose cover art is served behind a redirect
pub const RG_REDIRECTED_ID: &str = "rg-redirected";

/// Release group with an empty image list
pub const RG_EMPTY_ID: &str = "rg-empty";

/// Release group unknown to the cover art service
pub const RG_MISSING_ID: &str = "rg-missing";

pub const UNKNOWN_ARTIST_BODY: &str = "{\"error\":\"Not Found\"}";

pub const BAD_REQUEST_BODY: &str = "{\"error\":\"Invalid mbid.\"}";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
