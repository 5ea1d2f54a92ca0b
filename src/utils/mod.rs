pub mod colors;
pub mod html;
