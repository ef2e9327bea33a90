pub mod files;
pub mod pages;

pub use files::FileService;
pub use pages::PageService;
