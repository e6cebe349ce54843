pub mod admin;
pub mod ai;
pub mod contact;
pub mod content;
pub mod health;
pub mod routes;
