//! Alternate run modes that bypass the weather path.
//!
//! Both run inside the control loop and end through its shutdown.

pub mod cycle;
pub mod test_pattern;
