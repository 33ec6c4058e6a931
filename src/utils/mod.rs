//! Utility modules
//!
//! This module contains helpers shared by the command line tool.

pub mod logger;
