//! Stream combinators for sample consumers

mod throttle;

pub use throttle::{Throttle, ThrottleExt};
