#![no_main]

use libfuzzer_sys::fuzz_target;
use valentine::layout::RainLayoutBuilder;

fuzz_target!(|data: &[u8]| {
    let Some((&density, rest)) = data.split_first() else {
        return;
    };
    let photos: Vec<String> = String::from_utf8_lossy(rest)
        .split('\n')
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    let builder = RainLayoutBuilder::new()
        .per_photo(usize::from(density % 8))
        .bounds(usize::from(density >> 4), usize::from(density));
    let items = builder.build(&photos);

    assert_eq!(items.len(), builder.item_count(photos.len()));
    for item in &items {
        assert!((0.0..100.0).contains(&item.x), "x out of range: {}", item.x);
        assert!(item.delay <= 0.0 && item.delay >= -item.duration);
    }
});
