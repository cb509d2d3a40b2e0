mod key;
mod url;

pub use self::key::{Key, KeyParseError};
pub use self::url::{Url, UrlParseError, redirect_target};
