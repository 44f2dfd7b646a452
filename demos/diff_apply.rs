use anchored_list::{Controller, DataSource, Item, LayoutOptions, classify};

#[derive(Clone, Debug, PartialEq)]
struct Row {
    key: &'static str,
    body: &'static str,
}

impl Item for Row {
    type Id = &'static str;

    fn id(&self) -> &'static str {
        self.key
    }
}

const fn row(key: &'static str, body: &'static str) -> Row {
    Row { key, body }
}

fn main() {
    let before = [row("a", "1"), row("b", "1"), row("c", "1"), row("d", "1")];
    let after = [row("x", "1"), row("b", "2"), row("c", "1")];

    // Classification alone is a pure function of the two snapshots.
    for op in classify(&before, &after) {
        println!("{:?} {:?}", op.kind(), op.ids());
    }

    // A source logs the same operations; the controller replays them into its layout.
    let mut source = DataSource::with_items(before);
    let mut layout = Controller::new(LayoutOptions::new(16));
    layout.sync(&source);
    let first_c = layout.store().index_of(&"c").and_then(|i| layout.store().position(i));

    let logged = source.apply(after);
    let out = layout.sync(&source);
    println!("logged={logged} applied={} version={}", out.applied, source.version());

    let moved_c = layout.store().index_of(&"c").and_then(|i| layout.store().position(i));
    println!("c: {first_c:?} -> {moved_c:?}");
    for (id, item) in layout.store().iter() {
        println!("  {id} at {} (+{})", item.position, item.extent);
    }
}
