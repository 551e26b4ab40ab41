pub mod error;
pub mod github;
pub mod liveness;
pub mod resend;

#[cfg(test)]
mod test_support;
