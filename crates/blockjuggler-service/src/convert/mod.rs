//! Calendar to leave block conversion.
//!
//! - `slot`: Decline filter and occurrence normalization
//! - `leave`: Gap-filling merge into leave intervals
//! - `converter`: Window selection, error policy and block rendering

mod converter;
pub mod leave;
pub mod slot;

pub use converter::{Conversion, ConversionOptions, Converter};
pub use leave::{LeaveBlock, LeaveBound, LeaveEntry, LeaveInterval, merge_slots};
pub use slot::{NormalizedSlot, extract_slot, is_declined, slot_label};
