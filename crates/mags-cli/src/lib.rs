//! MAGS CLI 라이브러리.
//!
//! `mags` 바이너리의 서브커맨드 구현을 제공합니다.

pub mod commands;

pub use commands::*;
