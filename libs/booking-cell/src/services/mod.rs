pub mod availability;
pub mod booking;
pub mod catalog;
pub mod ledger;

pub use availability::AvailabilityIndex;
pub use booking::BookingCoordinator;
pub use catalog::SlotCatalog;
pub use ledger::ReservationLedger;
