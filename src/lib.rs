pub mod canteen_loader;
pub mod constants;
pub mod data_backend;
pub mod data_types;
pub mod errors;
pub mod feed_builder;
pub mod fetcher;
pub mod shared_main;
