pub mod drawing_service;
pub mod fulfillment_service;
pub mod ledger_service;
pub mod ticket_service;

pub use drawing_service::*;
pub use fulfillment_service::*;
pub use ledger_service::*;
pub use ticket_service::*;
