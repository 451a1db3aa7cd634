pub mod db_structs;
pub mod memory;
pub mod store;
