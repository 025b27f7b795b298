//! Database initialization, migrations and row conversion

pub mod init;
pub mod migrations;
pub mod rows;

pub use init::*;
pub use migrations::*;
pub use rows::*;
