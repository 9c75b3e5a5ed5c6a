pub mod api;
pub mod auth;
pub mod obs;
pub mod provision;
pub mod util;

#[cfg(test)]
pub mod test_support;
