mod blocks;
mod catalog;
mod config;
mod core;
mod error;
mod images;
mod inlines;
mod links;
mod lists;
mod marks;
mod normalize;
mod ops;
mod plugin;
mod schema;
mod shortcuts;
mod table;
mod value;
mod variables;
mod video;

pub mod path;
pub mod query;
pub mod serializers;
pub mod transforms;

pub use crate::blocks::*;
pub use crate::catalog::*;
pub use crate::config::*;
pub use crate::core::*;
pub use crate::error::*;
pub use crate::images::*;
pub use crate::inlines::*;
pub use crate::links::*;
pub use crate::lists::*;
pub use crate::marks::*;
pub use crate::normalize::CorePlugin;
pub use crate::ops::*;
pub use crate::path::Path;
pub use crate::plugin::*;
pub use crate::schema::*;
pub use crate::shortcuts::*;
pub use crate::table::*;
pub use crate::value::*;
pub use crate::variables::*;
pub use crate::video::*;
