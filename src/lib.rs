pub mod config;
pub mod logger;
pub mod server;
pub mod source;
pub mod post;
pub mod rich_text;
pub mod listing;
pub mod adjacent;
pub mod reading_time;
pub mod post_processor;
pub mod site_builder;
pub mod util;
mod text_utils;
mod content_cache;
mod query_string;
mod view;
#[cfg(test)]
mod test_data;
