// src/models/mod.rs

pub mod admin;
pub mod exam;
pub mod organization;
pub mod question;
pub mod result;
pub mod student;
