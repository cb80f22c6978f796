/// UI module exports
pub mod popup;
pub mod settings;

mod components;
