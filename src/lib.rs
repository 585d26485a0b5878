/*
 * Responsibility
 * - stateless bearer-token 認証 (HS256 JWT) のライブラリ本体
 * - binary (main.rs / bin/token_gen.rs) と tests/ から使う
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
