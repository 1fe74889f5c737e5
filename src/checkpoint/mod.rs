/*!
 * Checkpoint persistence.
 *
 * This module provides SQLite-backed storage for translation cache snapshots:
 * - `schema`: table definitions and versioning
 * - `store`: snapshot load/save with integrity checks
 */

pub mod schema;
pub mod store;

pub use store::CheckpointStore;
