pub mod backend;
pub mod models;

pub use backend::LinkStore;
pub use models::{ClickRecord, FieldPatch, Link, LinkPatch, NewLink, Owner, Plan};
