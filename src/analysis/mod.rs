/// Flood risk scoring.
///
/// Scoring is pure: it takes the three upstream snapshots and returns a
/// graded score without any I/O, so every rule here is testable offline.
///
/// Submodules:
/// - `factors` — per-input normalisation into [0, 1].
/// - `risk`    — weighted composite, grading, confidence and advice.

pub mod factors;
pub mod risk;
