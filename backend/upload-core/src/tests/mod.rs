mod chunk;
mod config;
