pub mod convert;
pub mod health;
pub mod send;
pub mod summarize;
