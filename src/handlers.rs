pub mod machines;
pub mod plannings;
pub mod products;
pub mod system;
pub mod transactions;

#[cfg(test)]
pub(crate) mod test_support;
