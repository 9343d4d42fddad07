use deepkey::key::Key;
use deepkey::map::TrieMap;
use deepkey::trie::Trie;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

fn main() {
    static POPULATION_SIZE: usize = 10;
    static SIZE: usize = 10;

    // Create our map, a trie and a collection of searches
    let mut map = TrieMap::new();
    let mut trie = Trie::new();
    let mut searches = vec![];

    // Store 10 random strings (char sequences)
    // composed of between 1 and 10 characters in
    // our search collection, our map and our trie.
    for _i in 0..POPULATION_SIZE {
        let entry: Vec<char> = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(thread_rng().gen_range(1..=SIZE))
            .map(char::from)
            .collect();
        let key: Key<char> = entry.clone().into();
        let len = entry.len();
        searches.push(entry);
        trie.insert(key.as_seq().unwrap_or_default(), len);
        map.insert(key, len);
    }

    // The map yields keys as they were inserted
    println!("insertion order");
    for (key, value) in map.iter() {
        let word: String = key
            .as_seq()
            .unwrap_or_default()
            .iter()
            .filter_map(Key::as_atom)
            .collect();
        assert!(searches.iter().any(|s| String::from_iter(s) == word));
        println!("key: {}, value: {}", word, value);
    }

    // The trie rebuilds keys from its structure, in element order
    println!("element order");
    for pair in trie.iter() {
        let word: String = pair.key.iter().filter_map(Key::as_atom).collect();
        assert!(searches.iter().any(|s| String::from_iter(s) == word));
        println!("key: {}, value: {}", word, pair.value);
    }
}
