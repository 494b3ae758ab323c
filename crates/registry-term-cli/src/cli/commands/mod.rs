pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod input;
pub mod report;

pub use dispatch::dispatch;
