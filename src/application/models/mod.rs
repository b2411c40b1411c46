pub mod order_page;

pub mod window;
