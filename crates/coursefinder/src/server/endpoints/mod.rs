pub mod saved;
pub mod search;
pub mod status;
