pub mod dart;
pub mod google_news;
