pub mod period;
pub mod rates;
