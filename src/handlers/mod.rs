pub mod drawing;
pub mod fulfillment;
pub mod ledger;

pub use drawing::drawing_config;
pub use fulfillment::fulfillment_config;
pub use ledger::ledger_config;
