pub mod feed;
pub mod preference;
pub mod warning;
