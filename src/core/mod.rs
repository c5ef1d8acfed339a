pub mod branch;
pub mod config;
pub mod content;
pub mod input;
pub mod ledger;
pub mod lint;
pub mod machine;
pub mod navigator;
pub mod presenter;
pub mod resolver;
pub mod typewriter;
