//! # Asset Crop
//!
//! A maintenance tool for a game's image assets. It walks an asset root,
//! finds JPEGs of one exact size, and removes a fixed number of rows from
//! their bottom edge, leaving a verified `.backup` beside every file it
//! rewrites. Companion commands delete or restore those backups, and an
//! analysis pass reports which images the crop predicate would skip.
//!
//! # Pipeline
//!
//! ```text
//! crop      root/  →  cropped JPEGs + <name>.backup   (per image: identify → match → backup → crop)
//! clean     root/  →  backups deleted
//! restore   root/  →  originals copied back from backups
//! analyze   root/  →  skipped_images_report_<timestamp>.json
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`crop`] | The per-image conditional crop: match predicate, backup, rewrite, recovery |
//! | [`backup`] | Create, verify, restore, and remove `.backup` sibling files |
//! | [`scan`] | Folder discovery with an exclusion list; image and backup listings |
//! | [`batch`] | Whole-tree crop, cleanup, and restore runs with progress events |
//! | [`analyze`] | Per-image probe and the skipped-images JSON report |
//! | [`config`] | `crop.toml` loading, merging over stock defaults, and validation |
//! | [`imaging`] | Image backend trait, crop geometry, and the `image`-crate backend |
//! | [`output`] | CLI output formatting for every run |
//!
//! # Design Decisions
//!
//! ## Backup Before Write, Verified
//!
//! No image is rewritten until its backup has been copied, fsynced, and
//! hash-checked against the source. The cropped image is encoded in memory
//! first, so a decode or encode failure never touches the original. If the
//! final write fails anyway, the backup is copied back over the original
//! unless `restore_on_failure` is off.
//!
//! ## One Predicate, Many Targets
//!
//! The match size and crop amount are a [`crop::CropSpec`] value built from
//! configuration, not constants. Width is optional: a spec may match on
//! height alone (`*x768`) or on an exact `768x576`.
//!
//! ## Failures Are Records
//!
//! [`crop::crop`] never returns `Err`. Every per-image problem becomes a
//! [`crop::CropResult::Failed`] and the batch run moves on. Only run-level
//! problems such as a missing asset root stop a run.
//!
//! ## Backend Trait
//!
//! All pixel work goes through [`imaging::ImageBackend`]. The production
//! [`imaging::RustBackend`] uses the pure-Rust `image` crate; tests swap in a
//! recording mock that can inject write failures.

pub mod analyze;
pub mod backup;
pub mod batch;
pub mod config;
pub mod crop;
pub mod imaging;
pub mod output;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
