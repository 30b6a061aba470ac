pub mod dispatch;
pub mod souq;
