//! Helper functions for views
//!
//! Date formatting, HTML escaping and URL generation shared by the
//! presentation layer and the CLI.

mod date;
mod html;
mod url;

pub use self::date::*;
pub use self::html::*;
pub use self::url::*;
