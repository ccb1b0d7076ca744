pub mod classifier;
pub mod db;
pub mod email;
