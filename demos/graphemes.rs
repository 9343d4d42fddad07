use deepkey::key::Key;
use deepkey::map::TrieMap;
use unicode_segmentation::UnicodeSegmentation;

fn main() {
    // Create our map
    let mut map = TrieMap::new();

    // Insert a key made of grapheme clusters
    let s = "a̐éö̲\r\n";
    let key: Key<&str> = s.graphemes(true).map(Key::atom).collect();
    let count = s.graphemes(true).count();
    map.insert(key, count);

    // A freshly built key with the same clusters finds the same entry
    let probe: Key<&str> = s.graphemes(true).map(Key::atom).collect();
    assert!(map.contains_key(&probe));
    assert_eq!(map.get(&probe), Some(&count));
}
