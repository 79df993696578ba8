#![no_main]

use binmap::prelude::*;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Entry {
    tag: u8,
    name: String,
    wide: String,
    delta: i64,
    payload: Vec<u8>,
}

fn entry(e: &mut Entry) -> BoxMapper<'_> {
    sequence(vec![
        byte(&mut e.tag),
        null_term_string(&mut e.name),
        override_endian(wide_null_term_string(&mut e.wide), Endian::Little),
        varint(&mut e.delta),
        dynamic_slice(&mut e.payload, byte),
    ])
}

fuzz_target!(|data: &[u8]| {
    let mut entries: Vec<Entry> = Vec::new();
    let mut rows = 0u32;
    let mut ids: Vec<u64> = Vec::new();
    let mut scores: Vec<f32> = Vec::new();
    let _ = sequence(vec![
        dynamic_slice(&mut entries, entry),
        data_table(
            &mut rows,
            vec![map_field(&mut ids, uvarint), map_field(&mut scores, float)],
        ),
    ])
    .read(&mut &data[..], Endian::Big);
});
