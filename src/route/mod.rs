pub mod feed;
pub mod model;
pub mod post;
pub mod sitemap;
