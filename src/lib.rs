pub mod config;
pub mod data_handler;
pub mod error;
pub mod feature_export;
pub mod feature_merge;
pub mod feature_store;
pub mod game_factory;
pub mod game_stats;
pub mod http_client;
pub mod pbp_fetch;
pub mod pbp_model;
pub mod pipeline;
pub mod play_table;
pub mod team_games;
pub mod temporal;
