pub mod details_codec;
pub mod filename;
pub mod highlighting;
pub mod random_name;
pub mod templates;

pub use details_codec::{decode_details, empty_token, encode_details};
pub use templates::TemplateRenderer;
