//! Сущности sea-orm реестра серверов.

pub mod servers;
