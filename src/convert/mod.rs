pub mod date;
pub mod html;
pub mod record;
pub mod select;
pub mod yaml;
