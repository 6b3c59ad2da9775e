pub mod classify;
pub mod mutate;
pub mod projection;
pub mod replica;
pub mod session;

#[cfg(test)]
pub mod test_helpers;
