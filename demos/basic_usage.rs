//! Basic usage example for artrie.

use artrie::{ArtTree, RadixTree};

fn main() {
    // Create a new ART index
    let mut art: ArtTree<u64> = ArtTree::new();

    println!("Inserting data...");
    art.insert(b"user:1001", 1001);
    art.insert(b"user:1002", 1002);
    art.insert(b"user:1003", 1003);
    art.insert(b"post:100", 100);
    art.insert(b"post:101", 101);

    println!("\nPoint lookups:");
    println!("  user:1001 = {:?}", art.search(b"user:1001"));
    println!("  user:9999 = {:?}", art.search(b"user:9999"));

    println!("\nUpdating user:1001...");
    art.insert(b"user:1001", 9999);
    println!("  New value: {:?}", art.search(b"user:1001"));

    println!("\nRemoving user:1002...");
    let removed = art.delete(b"user:1002");
    println!("  Removed: {removed}");
    println!("  Still present: {}", art.contains(b"user:1002"));

    println!("\nFinal count: {} keys", art.len());

    let issues = art.debug_integrity();
    if issues.is_empty() {
        println!("Integrity check: clean");
    } else {
        println!("Integrity check found issues: {issues:?}");
    }

    // The simpler sibling engine, same keys.
    let mut radix: RadixTree<u64> = RadixTree::new();
    radix.insert(b"roman", 1);
    radix.insert(b"romane", 2);
    radix.insert(b"romanus", 3);
    radix.insert(b"romanex", 4);

    println!("\nRadix tree lookups:");
    for key in [&b"roman"[..], b"romane", b"romanus", b"romanex", b"roma"] {
        println!(
            "  {} = {:?}",
            String::from_utf8_lossy(key),
            radix.search(key)
        );
    }
    println!("Radix tree count: {} keys", radix.len());
}
