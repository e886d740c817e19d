pub mod company;
pub mod db;
pub mod errors;
pub mod genre;
pub mod product;
pub mod product_image;
pub mod social_network;
pub mod user;
pub mod video;
