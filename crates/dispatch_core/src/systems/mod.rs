pub mod dispatch;
pub mod tick;
