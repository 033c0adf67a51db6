pub mod api;
pub mod boost;
pub mod config;
pub mod error;
pub mod head_to_head;
pub mod http_client;
pub mod match_stats;
pub mod player_stats;
pub mod players;
pub mod predict;
pub mod provider;
pub mod resolver;
pub mod service;
pub mod standings;
pub mod team_fixtures;
