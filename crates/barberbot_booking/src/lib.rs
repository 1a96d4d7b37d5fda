// --- File: crates/barberbot_booking/src/lib.rs ---
// Declare modules within this crate
pub mod availability;
#[cfg(test)]
mod availability_test;
pub mod catalog;
pub mod commit;
pub mod conflict;
pub mod customer;
pub mod engine;
pub mod error;
pub mod history;
pub mod hold;
pub mod slots;
#[cfg(test)]
mod slots_proptest;
#[cfg(test)]
mod test_support;

pub use availability::{AvailabilityAggregator, CandidateSlot, DayAvailability, ResourceSelector};
pub use catalog::{Barber, Break, BusinessCalendar, DayHours, OpeningHours, Service};
pub use commit::{BookingCommitter, BookingRequest, CommitOutcome, ConflictStage};
pub use customer::Customer;
pub use engine::{BookingEngine, Clock};
pub use error::{Backend, BookingError};
pub use history::{BookingHistory, BookingRecord, BookingStatus};
pub use hold::{BookingHold, HoldGuard, HoldLedger, HoldOutcome, SlotKey};
pub use slots::{BookingWindow, Slot, SlotRules};
