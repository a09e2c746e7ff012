//! Shared utilities and common types for the Rollcall backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Session-code generation
//! - QR token signing and verification
//! - Cryptographic utilities (hashing, constant-time comparison)
//! - Common validation logic

pub mod codes;
pub mod crypto;
pub mod token;
pub mod validation;
