pub mod actions;
pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{Auth, TestResponse};
#[allow(unused_imports)]
pub use assertions::{assert_cookies_cleared, assert_error_envelope, assert_no_cookies};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder, TEST_SECRET};
