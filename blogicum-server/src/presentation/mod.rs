pub mod dto;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;
