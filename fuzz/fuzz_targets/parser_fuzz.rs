//! Parser fuzz target: feed arbitrary bytes to the codec DSL parser.
//! The parser must not panic; it should return Ok(codecs) or Err(Error).
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 must surface as a scan error, not a panic.
    let _ = codecspec::parse_reader(data);
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(codecs) = codecspec::parse(s) {
            let printed = codecspec::print_codecs(&codecs);
            assert_eq!(codecspec::parse(&printed).ok(), Some(codecs));
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
