pub mod fade;
pub mod render_engine;
pub mod shows;
