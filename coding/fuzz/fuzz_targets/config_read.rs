#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use tessera_coding::Config;

fuzz_target!(|data: &[u8]| {
    let mut buf = data;
    let Ok(config) = Config::read(&mut buf) else {
        return;
    };
    assert!(config.validate().is_ok());
    assert_eq!(buf.len(), data.len() - Config::SIZE);

    let mut encoded = BytesMut::new();
    config.write(&mut encoded);
    assert_eq!(&encoded[..], &data[..Config::SIZE]);
});
