pub mod numeric;

#[cfg(test)]
pub mod test_utils;
