//! Сервисный слой поверх базы данных.

pub mod server_store;
