pub use module_manager::ModuleManager;
pub use output_module::{OutputModule, DMX_INTERVAL_MS};
pub use render_module::RenderModule;
pub use schedule_module::{ScheduleModule, DEFAULT_SCHEDULE_INTERVAL_MS};
pub use traits::{AsyncModule, ModuleEvent, ModuleId, ModuleMessage};

mod module_manager;
mod output_module;
mod render_module;
mod schedule_module;
mod traits;
