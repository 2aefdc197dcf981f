//! Extraction core
//!
//! Text-level scanning of LaTeX sources, independent of any document class.

pub mod texutils;
