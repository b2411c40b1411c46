pub mod order_client;

pub mod windowing;
