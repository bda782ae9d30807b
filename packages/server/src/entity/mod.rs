pub mod media_asset;
pub mod page_section;
