use std::{collections::BTreeSet, time::Instant};

use chisel_dom::{Document, ValueRef};

const INVENTORY: &str = r#"{
    "warehouse" : "north",
    "bins" : [
        { "sku" : "A-100", "count" : 12, "tags" : ["fragile"] },
        { "sku" : "B-220", "count" : 0, "tags" : [] },
        { "sku" : "C-310", "count" : 4096, "dimensions" : { "w" : 1.5, "h" : 0.25 } }
    ],
    "audit" : { "last" : null }
}"#;

/// Walk the tree collecting the dotted path of every node beneath `value`
fn collect_paths(value: ValueRef, prefix: &str, paths: &mut BTreeSet<String>) {
    let join = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", prefix, segment)
        }
    };
    if let Ok(members) = value.members() {
        for (key, member) in members {
            let path = join(key);
            collect_paths(member, &path, paths);
            paths.insert(path);
        }
    } else if let Ok(elements) = value.elements() {
        for (index, element) in elements.enumerate() {
            let path = join(&index.to_string());
            collect_paths(element, &path, paths);
            paths.insert(path);
        }
    }
}

/// Parse a small document, list every dotted path within it, and then edit it through paths
fn main() {
    let start = Instant::now();
    let mut doc: Document = match INVENTORY.parse() {
        Ok(doc) => doc,
        Err(err) => {
            eprintln!("failed to parse inventory: {}", err);
            return;
        }
    };

    let mut paths = BTreeSet::new();
    collect_paths(doc.value(), "", &mut paths);
    paths.iter().for_each(|path| {
        let kind = doc.value().get_path(path).map(|v| v.kind());
        println!("Found path: {} ({})", path, kind.map(|k| k.to_string()).unwrap_or_default())
    });

    let mut root = doc.value_mut();
    let edits = [
        root.set_path("bins.1.count", 64),
        root.set_path("audit.last", "2024-03-01"),
        root.set_path("audit.by.name", "inventory bot"),
        root.remove_path("bins.0.tags").map(|_| ()),
    ];
    for edit in edits.iter().filter_map(|edit| edit.as_ref().err()) {
        eprintln!("edit failed: {}", edit);
    }

    println!("Edited document: {}", doc);
    println!("Arena usage: {}", doc.arena_stats());
    println!("Completed in: {:?}", start.elapsed());
}
