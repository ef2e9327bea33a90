pub mod files;

pub mod pages;

pub use files::configure_file_routes;
pub use pages::configure_page_routes;
