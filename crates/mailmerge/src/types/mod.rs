mod record;
mod template;

pub use record::DataRecord;
pub use template::Template;
