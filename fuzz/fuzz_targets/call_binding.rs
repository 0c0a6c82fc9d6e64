#![no_main]

use fibmark::fibonacci::fibonacci;
use fibmark::schema::Call;
use fibmark::subject::FIBONACCI;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Variant parsing and keyword binding must never panic
        let _ = fibonacci(10, input, None);

        let mut call = Call::new();
        for (i, name) in input.split(',').enumerate() {
            call = call.kwarg(name, i as u64);
        }
        let _ = FIBONACCI.bind(call);
    }
});
