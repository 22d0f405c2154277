pub mod config;
pub mod db;
pub mod routes {
    pub mod analysis;
    pub mod common;
    pub mod health;
    pub mod strategy;
    pub mod trading;
}
pub mod services {
    pub mod account;
    pub mod analysis;
    pub mod indicators;
    pub mod market_data;
    pub mod trading_engine;
    pub mod validator;

    pub mod pionex;
    pub mod strategies;
}

pub mod utils;
