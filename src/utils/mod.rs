// Start of file: /src/utils/mod.rs

/*
    * Shared helpers: layer error mapping, the response envelope
    * and JSON file persistence.
*/

pub mod error_handler;
pub mod json_files;
pub mod response_handler;

// End of file: /src/utils/mod.rs
