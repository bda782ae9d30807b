mod common;
mod content;
mod media;
