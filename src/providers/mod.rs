pub mod currency_api;
pub mod util;
