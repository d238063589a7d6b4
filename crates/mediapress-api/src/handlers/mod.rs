pub mod convert_image;
pub mod convert_video;
pub mod meta;
