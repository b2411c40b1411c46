pub mod logger;

pub mod orders;
