#![no_main]
use libfuzzer_sys::fuzz_target;
use rigtel_core::{CalibrationTable, LineParser, SequenceAssigner};

fuzz_target!(|data: &str| {
    // Arbitrary transport garbage must either parse into a reading or come
    // back as a typed rejection; it must never panic or consume a sequence
    // number on the error path.
    let parser = LineParser::new(CalibrationTable::factory());
    let mut seq = SequenceAssigner::new();
    match parser.parse_at(data, &mut seq, None) {
        Ok(reading) => {
            assert_eq!(reading.sequence, 1);
            assert_eq!(seq.peek(), 2);
        }
        Err(_) => {
            assert_eq!(seq.peek(), 1);
        }
    }
});
