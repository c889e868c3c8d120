pub mod drawing;
pub mod fulfillment;
pub mod ledger;
pub mod pagination;
pub mod prize;
pub mod ticket;

pub use drawing::*;
pub use fulfillment::*;
pub use ledger::*;
pub use pagination::*;
pub use prize::*;
pub use ticket::*;
