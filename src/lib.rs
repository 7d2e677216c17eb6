pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod history;
pub mod pipeline;
pub mod process;

#[cfg(test)]
pub(crate) mod test_support;
