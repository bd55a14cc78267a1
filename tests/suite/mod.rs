mod analysis_flow;
mod config;
mod game;
mod provider;
