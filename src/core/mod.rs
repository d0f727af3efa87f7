pub mod db;
pub mod sync;
