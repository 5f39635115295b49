pub mod aggregate;
pub mod db;
pub mod directory;
pub mod export;
pub mod grouping;
pub mod meal;
pub mod models;
pub mod recipes;
pub mod render;
pub mod scaling;
pub mod service;
pub mod state;
pub mod units;
