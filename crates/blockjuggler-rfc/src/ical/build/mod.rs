//! iCalendar serialization.

mod escape;
mod fold;
mod serializer;

pub use escape::escape_param_value;
pub use fold::fold_line;
pub use serializer::{serialize_component, serialize_property};
