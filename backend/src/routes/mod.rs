pub mod health;
pub mod stock_prices;
