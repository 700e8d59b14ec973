use bytes::Bytes;

pub fn get_test_key(i: usize) -> String {
  format!("pagekv-key-{:09}", i)
}

pub fn get_test_value(i: usize) -> Bytes {
  Bytes::from(format!("pagekv-value-{:09}", i))
}
