pub mod backtrace;
pub mod exit;
pub mod results;
