mod chunk;
mod formatter;
mod shape;
mod template;

pub use chunk::chunk_message;
pub use formatter::{ResponseFormatter, build_format_prompt};
pub use shape::ResultShape;
pub use template::{no_records_message, render_template};
