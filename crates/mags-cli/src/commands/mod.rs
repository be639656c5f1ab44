//! CLI 명령 모듈.

pub mod context;
pub mod holdings;
pub mod interactive;
pub mod output;
pub mod quotes;
pub mod whatif;
