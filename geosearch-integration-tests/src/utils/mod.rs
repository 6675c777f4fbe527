//! Helpers shared by the tests.

pub mod logging;
pub mod test_tools;
