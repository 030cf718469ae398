//! # Repositories
//!
//! One repository per aggregate, each a lightweight struct over the shared
//! `SqlitePool`. Write paths that belong to a document are transactional
//! within the repository; cross-document orchestration lives in `service`.

pub mod expense;
pub mod item;
pub mod party;
pub mod payment;
pub mod purchase;
pub mod returns;
pub mod sale;
pub mod stock;
pub mod warehouse;
pub mod worker;
