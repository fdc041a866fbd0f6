/// Turning uploaded files into `Dataset`s.
///
/// Submodules:
/// - `csv` — header-driven CSV reader with per-column type inference.

pub mod csv;
