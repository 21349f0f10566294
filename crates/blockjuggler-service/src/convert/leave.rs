//! Gap-filling merge of booked slots into TaskJuggler leaves.
//!
//! A resource is on leave from the project everywhere it is not booked, so the
//! block covers the gaps around the slots, from `${projectstart}` to
//! `${projectend}`.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use super::slot::NormalizedSlot;
use crate::tj::{PROJECT_END, PROJECT_START, comment_datetime, tj_datetime};

/// One end of a leave interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveBound {
    ProjectStart,
    At(DateTime<Tz>),
    ProjectEnd,
}

impl fmt::Display for LeaveBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectStart => f.write_str(PROJECT_START),
            Self::At(dt) => f.write_str(&tj_datetime(dt)),
            Self::ProjectEnd => f.write_str(PROJECT_END),
        }
    }
}

/// A span during which the resource is unavailable for the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveInterval {
    pub from: LeaveBound,
    pub to: LeaveBound,
}

/// Line group of a leave block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveEntry {
    /// Comment lines describing a booked slot.
    Slot(NormalizedSlot),
    Leave(LeaveInterval),
}

/// The body of a `supplement resource` block, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveBlock {
    pub entries: Vec<LeaveEntry>,
}

impl LeaveBlock {
    /// Returns the leave intervals, skipping slot comments.
    pub fn leaves(&self) -> impl Iterator<Item = &LeaveInterval> {
        self.entries.iter().filter_map(|entry| match entry {
            LeaveEntry::Leave(leave) => Some(leave),
            LeaveEntry::Slot(_) => None,
        })
    }

    fn push_leave(&mut self, from: LeaveBound, to: LeaveBound) {
        self.entries.push(LeaveEntry::Leave(LeaveInterval { from, to }));
    }
}

impl fmt::Display for LeaveBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                LeaveEntry::Slot(slot) => {
                    writeln!(f, "  # {}", slot.label)?;
                    writeln!(
                        f,
                        "  # {} - {}",
                        comment_datetime(&slot.start),
                        comment_datetime(&slot.end)
                    )?;
                }
                LeaveEntry::Leave(leave) => {
                    writeln!(f, "  leaves project {} - {}", leave.from, leave.to)?;
                }
            }
        }
        Ok(())
    }
}

/// ## Summary
/// Sorts `slots` and emits the leaves filling the gaps between them.
///
/// - The first slot always gets a leave from `${projectstart}` to its start.
/// - A later slot gets a leave from the running end only when it starts
///   strictly after it. Touching and overlapping slots leave no gap.
/// - The running end is the latest end seen so far.
/// - A final leave runs from the running end to `${projectend}`.
///
/// Identical slots (same start, end and label) are emitted once. With no
/// slots the block is a single `${projectstart} - ${projectend}` leave.
#[must_use]
pub fn merge_slots(mut slots: Vec<NormalizedSlot>) -> LeaveBlock {
    slots.sort();
    slots.dedup();

    let mut block = LeaveBlock::default();
    let mut last_end: Option<DateTime<Tz>> = None;

    for slot in slots {
        let start = slot.start;
        let end = slot.end;
        block.entries.push(LeaveEntry::Slot(slot));

        match last_end {
            None => block.push_leave(LeaveBound::ProjectStart, LeaveBound::At(start)),
            Some(previous) if start > previous => {
                block.push_leave(LeaveBound::At(previous), LeaveBound::At(start));
            }
            Some(_) => {}
        }

        last_end = Some(last_end.map_or(end, |previous| previous.max(end)));
    }

    let from = last_end.map_or(LeaveBound::ProjectStart, LeaveBound::At);
    block.push_leave(from, LeaveBound::ProjectEnd);

    tracing::trace!(entries = block.entries.len(), "Merged slots");
    block
}
