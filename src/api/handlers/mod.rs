mod redirect;
mod shorten;

pub(crate) use redirect::redirect;
pub(crate) use shorten::shorten;

pub use shorten::{ShortenRequest, ShortenResponse};
