use bytes::Bytes;
use pagekv::{
  db::{LoadOutcome, Store},
  medium::file::FileMedium,
  option::Options,
};

fn print_value(value: &Bytes) {
  let hex: Vec<String> = value.iter().map(|b| format!("{:02x}", b)).collect();
  println!("[{}]", hex.join(" "));
}

fn main() {
  env_logger::init();

  let path = std::env::args()
    .nth(1)
    .unwrap_or_else(|| "/tmp/pagekv-demo.bin".to_string());

  let opts = Options::default();
  let medium = FileMedium::new(&path, opts.region_size).expect("failed to open medium file");
  let mut store = Store::new(Box::new(medium), opts).expect("failed to open store");

  match store.load().expect("failed to load store") {
    LoadOutcome::Loaded => println!("store loaded from {}", path),
    LoadOutcome::Empty => println!("no store found in {}, a new one will be created on save", path),
  }

  match store.read_key("test").expect("store not loaded") {
    Some(value) => {
      print!("read key [test], value: ");
      print_value(&value);
    }
    None => println!("key [test] not found"),
  }

  store
    .write_key("test", Bytes::from(vec![0x01, 0x02, 0x03, 0x04]))
    .expect("failed to write key");
  store
    .write_key("test2", Bytes::from(vec![0x05, 0x06, 0x07, 0x08]))
    .expect("failed to write key");

  println!("all keys:");
  for key in store.all_keys().expect("store not loaded") {
    match store.read_key(&key).expect("store not loaded") {
      Some(value) => {
        print!("  [{}] = ", key);
        print_value(&value);
      }
      None => println!("  [{}] = not found", key),
    }
  }

  store.save().expect("failed to save store");
  println!("store saved to {}", path);
}
