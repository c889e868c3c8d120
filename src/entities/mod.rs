pub mod drawings;
pub mod point_transactions;
pub mod prize_fulfillments;
pub mod prizes;
pub mod tickets;
pub mod users;

pub use drawings as drawing_entity;
pub use point_transactions as point_transaction_entity;
pub use prize_fulfillments as prize_fulfillment_entity;
pub use prizes as prize_entity;
pub use tickets as ticket_entity;
pub use users as user_entity;

pub use drawings::{DrawingStatus, DrawingType};
pub use point_transactions::TransactionType;
pub use prize_fulfillments::FulfillmentStatus;
pub use prizes::FulfillmentType;
