//! Input limits and validation helpers shared by the CLI and the web server.

pub mod validation;
