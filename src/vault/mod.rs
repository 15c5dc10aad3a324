pub mod archive;
pub mod config;
pub mod locator;
pub mod paths;
pub mod util;
pub mod warn;
pub mod week;
