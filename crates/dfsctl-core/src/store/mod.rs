// ── State stores ──
//
// Implementations of the reader and executor seams that keep managed
// state outside a live host.

pub mod inventory;

pub use inventory::Inventory;
